use std::sync::Arc;

use crate::{
    crud::CrudService,
    domain::{Account, CreditCard, Message},
    ledger::LedgerService,
    owner::OwnerService,
    repository::{BankStore, MemoryStore},
};

pub type AccountService = OwnerService<Account, dyn BankStore>;
pub type CreditCardService = OwnerService<CreditCard, dyn BankStore>;
pub type AccountLedger = LedgerService<Account, dyn BankStore, dyn BankStore>;
pub type CardLedger = LedgerService<CreditCard, dyn BankStore, dyn BankStore>;
pub type MessageService = CrudService<Message, dyn BankStore>;

/// Every service, wired to one store.
///
/// # Examples
/// ```
/// let bank = service::Bank::in_memory();
/// let found = tokio_test::block_on(bank.accounts.get_by_owner_id("nobody")).unwrap();
/// assert!(found.is_empty());
/// ```
#[derive(Clone)]
pub struct Bank {
    pub accounts: AccountService,
    pub cards: CreditCardService,
    pub account_transactions: AccountLedger,
    pub card_transactions: CardLedger,
    pub messages: MessageService,
}

impl Bank {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self {
            accounts: OwnerService::new(store.clone()),
            cards: OwnerService::new(store.clone()),
            account_transactions: LedgerService::new(store.clone(), store.clone()),
            card_transactions: LedgerService::new(store.clone(), store.clone()),
            messages: CrudService::new(store),
        }
    }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStore::new())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{account, entry_at};

    #[tokio::test]
    async fn account_attach_scenario() {
        let bank = Bank::in_memory();
        let acc = bank.accounts.save(account("u1", "ACC-100")).await.unwrap();
        let account_id = acc.id.unwrap();

        let tx = bank.account_transactions.save(entry_at(2024, 2, 1, "15.00"), account_id).await.unwrap().unwrap();
        let listed = bank.account_transactions.get_by_parent_id(account_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, tx.id);
        assert_eq!(listed[0].account_id, Some(account_id));

        let reloaded = bank.accounts.get_by_id(account_id).await.unwrap().unwrap();
        assert_eq!(reloaded.transactions, listed);
    }

    #[tokio::test]
    async fn deleting_the_account_cascades() {
        let bank = Bank::in_memory();
        let account_id = bank.accounts.save(account("u1", "ACC-200")).await.unwrap().id.unwrap();
        let tx_id = bank
            .account_transactions
            .save(entry_at(2024, 2, 1, "15.00"), account_id)
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();

        assert!(bank.accounts.delete(account_id).await.unwrap());
        assert!(bank.account_transactions.get_by_id(tx_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_replace_update_drops_omitted_transactions() {
        let bank = Bank::in_memory();
        let account_id = bank.accounts.save(account("u1", "ACC-300")).await.unwrap().id.unwrap();
        bank.account_transactions.save(entry_at(2024, 2, 1, "1.00"), account_id).await.unwrap();

        let updated = bank.accounts.update(account_id, account("u1", "ACC-300")).await.unwrap().unwrap();
        assert!(updated.transactions.is_empty());
        assert!(bank.account_transactions.get_by_parent_id(account_id).await.unwrap().is_empty());
    }
}

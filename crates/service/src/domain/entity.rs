use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// A persisted record with a store-assigned identifier.
///
/// `id()` is `None` until the first save. `CrudService::update` uses
/// `set_id` to force the path id onto the submitted body.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Short name used in logs.
    const NAME: &'static str;

    fn id(&self) -> Option<Self::Id>;
    fn set_id(&mut self, id: Self::Id);
}

/// Records that belong to an external customer identifier.
pub trait Owned: Entity {
    fn owner_id(&self) -> &str;
}

//! Monetary columns are `NUMERIC(19, 2)`.

use rust_decimal::Decimal;

use crate::errors::ModelError;

pub const SCALE: u32 = 2;

/// Reject amounts that would be silently rounded by the column.
pub fn validate_money(field: &str, value: Decimal) -> Result<(), ModelError> {
    if value.normalize().scale() > SCALE {
        return Err(ModelError::Validation(format!("{field} must have at most {SCALE} fractional digits")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_fraction_digits_accepted() {
        assert!(validate_money("balance", Decimal::new(10050, 2)).is_ok());
        // trailing zeros beyond the scale are not significant
        assert!(validate_money("balance", Decimal::new(1_000_000, 4)).is_ok());
    }

    #[test]
    fn three_fraction_digits_rejected() {
        let err = validate_money("amount", Decimal::new(1001, 3)).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}

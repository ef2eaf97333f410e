use super::error::ValidationError;
use super::Decimal;
use serde::Serializer;

/// Fractional digits carried by every stored amount.
pub const SCALE: u32 = 2;

/// Largest representable magnitude: 20 significant digits, 2 of them fractional
/// (999,999,999,999,999,999.99).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_661_992_959, 1_808_227_885, 5, false, SCALE);

/// Serialize Decimal with exactly 2 decimal places
pub(crate) fn serialize_amount<S: Serializer>(
    value: &Decimal,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

/// Parse a caller-supplied amount string into a positive 2dp amount.
///
/// Trailing zeros beyond the second fractional digit are tolerated (`"1.500"`),
/// anything that would need rounding is not (`"1.505"`).
pub fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    let amount = Decimal::from_str_exact(trimmed)
        .map_err(|_| ValidationError::InvalidAmount(trimmed.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }

    let mut amount = amount.normalize();
    if amount.scale() > SCALE {
        return Err(ValidationError::TooManyDecimals);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountOverflow);
    }

    amount.rescale(SCALE);
    Ok(amount)
}

/// Apply a signed delta to a balance, `None` if the result leaves the representable range.
pub(crate) fn checked_apply(balance: Decimal, delta: Decimal) -> Option<Decimal> {
    balance
        .checked_add(delta)
        .filter(|value| value.abs() <= MAX_AMOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_max_amount_matches_column_width() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999999999.99));
        assert_eq!(MAX_AMOUNT.scale(), 2);
    }

    #[test]
    fn test_parse_valid_amounts_rescale_to_two_places() {
        assert_eq!(parse_amount("200").unwrap().to_string(), "200.00");
        assert_eq!(parse_amount("  12.5 ").unwrap().to_string(), "12.50");
        assert_eq!(parse_amount("0.01").unwrap(), dec!(0.01));
        assert_eq!(parse_amount("1.500").unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_rejects_unparsable_amount() {
        assert!(matches!(
            parse_amount("ten dollars"),
            Err(ValidationError::InvalidAmount(raw)) if raw == "ten dollars"
        ));
        assert!(matches!(
            parse_amount(""),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_rejects_zero_and_negative_amounts() {
        assert!(matches!(
            parse_amount("0"),
            Err(ValidationError::NonPositiveAmount)
        ));
        assert!(matches!(
            parse_amount("0.00"),
            Err(ValidationError::NonPositiveAmount)
        ));
        assert!(matches!(
            parse_amount("-5.00"),
            Err(ValidationError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_rejects_more_than_two_decimals() {
        assert!(matches!(
            parse_amount("1.234"),
            Err(ValidationError::TooManyDecimals)
        ));
    }

    #[test]
    fn test_rejects_amount_above_max() {
        assert!(parse_amount("999999999999999999.99").is_ok());
        assert!(matches!(
            parse_amount("1000000000000000000"),
            Err(ValidationError::AmountOverflow)
        ));
    }

    #[test]
    fn test_checked_apply_detects_overflow() {
        assert_eq!(checked_apply(dec!(10.00), dec!(-2.50)), Some(dec!(7.50)));
        assert_eq!(checked_apply(MAX_AMOUNT, dec!(0.01)), None);
        assert_eq!(checked_apply(MAX_AMOUNT - dec!(1), dec!(1)), Some(MAX_AMOUNT));
    }
}

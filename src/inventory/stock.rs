use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    Add,
    Subtract,
}

/// A stock change entered by the user: a strictly positive whole number.
pub fn parse_delta(input: &str) -> AppResult<u32> {
    match input.trim().parse::<u32>() {
        Ok(delta) if delta > 0 => Ok(delta),
        _ => Err(AppError::Validation(
            "Please enter a valid positive integer for quantity change".to_string(),
        )),
    }
}

/// New quantity after applying `delta`. Subtraction stops at zero.
pub fn apply_delta(current: u32, operation: StockOperation, delta: u32) -> u32 {
    match operation {
        StockOperation::Add => current.saturating_add(delta),
        StockOperation::Subtract => current.saturating_sub(delta),
    }
}

/// Initial quantity of a new part: a non-negative whole number.
pub fn parse_quantity(input: &str) -> AppResult<u32> {
    input.trim().parse::<u32>().map_err(|_| {
        AppError::Validation("Quantity must be a non-negative whole number".to_string())
    })
}

/// A price in currency units, rounded to cents.
pub fn parse_price(input: &str) -> AppResult<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| valid_price(*p))
        .map(|p| (p * 100.0).round() / 100.0)
        .filter(|p| p.is_finite())
        .ok_or_else(|| {
            AppError::Validation("Price must be a non-negative number".to_string())
        })
}

pub fn valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_delta() {
        assert_eq!(apply_delta(3, StockOperation::Add, 10), 13);
        assert_eq!(apply_delta(3, StockOperation::Subtract, 10), 0);
        assert_eq!(apply_delta(10, StockOperation::Subtract, 3), 7);
        assert_eq!(apply_delta(u32::MAX, StockOperation::Add, 1), u32::MAX);
    }

    #[test]
    fn test_parse_delta_accepts_positive_integers() {
        assert_eq!(parse_delta("10").unwrap(), 10);
        assert_eq!(parse_delta(" 7 ").unwrap(), 7);
    }

    #[test]
    fn test_parse_delta_rejects_invalid_input() {
        for input in ["0", "-3", "2.5", "abc", "", "1e3", "+"] {
            let err = parse_delta(input).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0").unwrap(), 0);
        assert_eq!(parse_quantity("12").unwrap(), 12);
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("ten").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("29.99").unwrap(), 29.99);
        assert_eq!(parse_price("0").unwrap(), 0.0);
        assert_eq!(parse_price("19.999").unwrap(), 20.0);
        assert!(parse_price("-1").is_err());
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn test_parse_price_rejects_overflow_when_rounding() {
        let err = parse_price("1e308").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(parse_price(&f64::MAX.to_string()).is_err());
    }

    #[test]
    fn test_operation_deserializes_lowercase() {
        let op: StockOperation = serde_json::from_str("\"subtract\"").unwrap();
        assert_eq!(op, StockOperation::Subtract);
    }
}

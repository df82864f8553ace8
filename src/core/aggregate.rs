use crate::domain::model::{NormalizedTable, Total};
use crate::utils::error::{Result, TollError};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a portal currency value such as `$1,234.50`, `-$0.75`, `$-0.75`, `+$1.00` or `($2.00)`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    let (negative, body) = match compact.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => match compact.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, compact.strip_prefix('+').unwrap_or(&compact)),
        },
    };
    if body.is_empty() || body.starts_with(['-', '+']) {
        return None;
    }
    let value = Decimal::from_str(body).ok()?;
    Some(if negative { -value } else { value })
}

/// Sums the amount column. A header-only table is an error, not a zero total.
pub fn sum_amount(table: &NormalizedTable, amount_header: &str) -> Result<Total> {
    let column = table.column_index(amount_header)?;
    if table.is_empty() {
        return Err(TollError::EmptyResult);
    }

    let mut total = Decimal::ZERO;
    for (idx, row) in table.rows().iter().enumerate() {
        let value = parse_amount(&row[column]).ok_or_else(|| TollError::InvalidAmount {
            row: idx + 1,
            value: row[column].clone(),
        })?;
        total += value;
    }

    tracing::debug!("Summed {} amounts: {}", table.len(), total);
    Ok(Total::new(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(amounts: &[&str]) -> NormalizedTable {
        NormalizedTable::new(
            vec!["Location".to_string(), "Amount".to_string()],
            amounts
                .iter()
                .enumerate()
                .map(|(i, a)| vec![format!("Plaza {}", i), a.to_string()])
                .collect(),
        )
        .unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("$1.25"), Some(dec("1.25")));
        assert_eq!(parse_amount(" $1,234.50 "), Some(dec("1234.50")));
        assert_eq!(parse_amount("-$0.75"), Some(dec("-0.75")));
        assert_eq!(parse_amount("($2.00)"), Some(dec("-2.00")));
        assert_eq!(parse_amount("3"), Some(dec("3")));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("--1"), None);
        assert_eq!(parse_amount("$-1.25"), Some(dec("-1.25")));
        assert_eq!(parse_amount("+$1.00"), Some(dec("1.00")));
        assert_eq!(parse_amount("+-1"), None);
        assert_eq!(parse_amount("($-2.00)"), None);
    }

    #[test]
    fn test_sum_amount() {
        let total = sum_amount(&table(&["$1.25", "$2.10", "$0.40"]), "Amount").unwrap();
        assert_eq!(total.amount(), dec("3.75"));
        assert_eq!(total.to_string(), "3.75");
    }

    #[test]
    fn test_sum_is_order_independent() {
        let amounts = ["$12.99", "$0.01", "($1.50)", "$7.25", "$100.00"];
        let mut reversed = amounts;
        reversed.reverse();
        let mut rotated = amounts;
        rotated.rotate_left(2);

        let expected = sum_amount(&table(&amounts), "Amount").unwrap();
        assert_eq!(expected.amount(), dec("118.75"));
        assert_eq!(sum_amount(&table(&reversed), "Amount").unwrap(), expected);
        assert_eq!(sum_amount(&table(&rotated), "Amount").unwrap(), expected);
    }

    #[test]
    fn test_amount_header_match_is_case_insensitive() {
        let table = NormalizedTable::new(
            vec!["AMOUNT".to_string()],
            vec![vec!["$5.00".to_string()]],
        )
        .unwrap();
        assert_eq!(sum_amount(&table, "amount").unwrap().amount(), dec("5.00"));
    }

    #[test]
    fn test_header_only_table_is_empty_result() {
        let err = sum_amount(&table(&[]), "Amount").unwrap_err();
        assert!(matches!(err, TollError::EmptyResult));
    }

    #[test]
    fn test_missing_amount_column() {
        let table = NormalizedTable::new(
            vec!["Location".to_string()],
            vec![vec!["Main Lane".to_string()]],
        )
        .unwrap();
        let err = sum_amount(&table, "Amount").unwrap_err();
        assert!(matches!(err, TollError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_unparseable_amount_is_reported_with_row() {
        let err = sum_amount(&table(&["$1.00", "pending"]), "Amount").unwrap_err();
        assert!(matches!(err, TollError::InvalidAmount { row: 2, .. }));
    }
}

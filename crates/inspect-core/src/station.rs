//! Station sort keys for punchlist resequencing.
//!
//! Field crews record `start_station` values as free text: usually a number
//! ("105.5"), sometimes an alignment label ("STA 4+20", "abc"). The resequencer
//! needs one deterministic ordering over the mix, so a station value is parsed
//! into a [`StationKey`]: numeric keys sort ascending and before every
//! non-numeric key, non-numeric keys sort lexicographically.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum StationKey {
    Numeric(f64),
    Text(String),
}

impl StationKey {
    /// Parse a raw station string. Only finite floats count as numeric; anything
    /// else falls back to the trimmed raw text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => StationKey::Numeric(value),
            _ => StationKey::Text(trimmed.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, StationKey::Numeric(_))
    }
}

impl Eq for StationKey {}

impl Ord for StationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (StationKey::Numeric(a), StationKey::Numeric(b)) => {
                // finite by construction
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (StationKey::Numeric(_), StationKey::Text(_)) => Ordering::Less,
            (StationKey::Text(_), StationKey::Numeric(_)) => Ordering::Greater,
            (StationKey::Text(a), StationKey::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for StationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order item ids by their station key, ties broken by id so repeated runs over
/// the same rows always produce the same sequence.
pub fn resequence(items: &[(i64, String)]) -> Vec<i64> {
    let mut keyed: Vec<(StationKey, i64)> = items
        .iter()
        .map(|(id, station)| (StationKey::parse(station), *id))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_sort_ascending() {
        let mut keys = vec![
            StationKey::parse("100"),
            StationKey::parse("20"),
            StationKey::parse("5"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                StationKey::Numeric(5.0),
                StationKey::Numeric(20.0),
                StationKey::Numeric(100.0),
            ]
        );
    }

    #[test]
    fn text_sorts_after_numbers() {
        let items = vec![
            (1, "100".to_string()),
            (2, "20".to_string()),
            (3, "abc".to_string()),
            (4, "5".to_string()),
        ];
        assert_eq!(resequence(&items), vec![4, 2, 1, 3]);
    }

    #[test]
    fn ties_break_by_id() {
        let items = vec![
            (9, "50".to_string()),
            (3, "50".to_string()),
            (7, "50".to_string()),
        ];
        assert_eq!(resequence(&items), vec![3, 7, 9]);
    }

    #[test]
    fn whitespace_and_decimals_parse_numeric() {
        assert!(StationKey::parse(" 12.75 ").is_numeric());
        assert!(!StationKey::parse("4+20").is_numeric());
        assert!(!StationKey::parse("").is_numeric());
    }

    #[test]
    fn non_finite_is_text() {
        assert!(!StationKey::parse("NaN").is_numeric());
        assert!(!StationKey::parse("inf").is_numeric());
    }
}

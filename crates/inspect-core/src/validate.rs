//! Field-level validation collected into per-field error messages.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::CoreResult;

/// Accumulates validation failures keyed by field name. Serializes as a flat
/// JSON object, which is the shape API clients expect under `errors`.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Record an error unless `value` is present and non-blank, returning the
    /// trimmed value otherwise.
    pub fn require_str<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.add(field, "this field is required");
                None
            }
        }
    }

    /// Record a parse failure for `field` if `result` is an error.
    pub fn check<T>(&mut self, field: &str, result: CoreResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disciplines::SurfaceType;

    #[test]
    fn require_str_flags_missing_and_blank() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.require_str("location", Some(" site 4 ")), Some("site 4"));
        assert_eq!(errors.require_str("date", None), None);
        assert_eq!(errors.require_str("feature", Some("   ")), None);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn check_records_parse_errors() {
        let mut errors = FieldErrors::new();
        assert!(errors
            .check("surface_type", SurfaceType::parse("steel"))
            .is_some());
        assert!(errors
            .check("surface_type", SurfaceType::parse("granite"))
            .is_none());
        assert!(!errors.is_empty());
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut errors = FieldErrors::new();
        errors.add("date", "this field is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["date"], "this field is required");
    }
}

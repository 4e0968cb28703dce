//! Field Inspection Reporting Core
//!
//! This crate provides the domain primitives shared across the inspection
//! reporting backend: discipline enumerations, station sort keys used by the
//! punchlist resequencer, and field-level validation.

pub mod disciplines;
pub mod station;
pub mod validate;

use thiserror::Error;

pub use disciplines::{
    CoatingType, OversightStatus, SurfaceType, SwpppInspectionType, UtilityType, WeldPosition,
    WeldType,
};
pub use station::StationKey;
pub use validate::FieldErrors;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl CoreError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

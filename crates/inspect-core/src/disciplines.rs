//! Enumerated categorical fields used by the discipline modules.
//!
//! Values are stored as their lowercase/uppercase wire strings in the database,
//! so each enum exposes `as_str` and a fallible `parse` used during request
//! validation.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            pub fn parse(value: &str) -> CoreResult<Self> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(CoreError::Parse(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Substrate being coated.
    SurfaceType {
        Steel => "steel",
        Concrete => "concrete",
        Wood => "wood",
        Other => "other",
    }
);

string_enum!(
    CoatingType {
        Epoxy => "epoxy",
        Polyurethane => "polyurethane",
        Zinc => "zinc",
        Other => "other",
    }
);

string_enum!(
    /// Checklist answer on a coating oversight item.
    OversightStatus {
        Yes => "yes",
        No => "no",
        NotApplicable => "na",
    }
);

string_enum!(
    WeldType {
        Butt => "BUTT",
        Fillet => "FILLET",
        Plug => "PLUG",
        Slot => "SLOT",
    }
);

string_enum!(
    WeldPosition {
        Flat => "FLAT",
        Horizontal => "HORIZONTAL",
        Vertical => "VERTICAL",
        Overhead => "OVERHEAD",
    }
);

string_enum!(
    UtilityType {
        Water => "water",
        Gas => "gas",
        Electric => "electric",
        Telecom => "telecom",
        Other => "other",
    }
);

string_enum!(
    /// Routine weekly inspection vs. precipitation event > 0.25".
    SwpppInspectionType {
        Routine => "routine",
        Precipitation => "precip",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_wire_strings() {
        assert_eq!(SurfaceType::parse("steel").unwrap(), SurfaceType::Steel);
        assert_eq!(SurfaceType::Steel.as_str(), "steel");
        assert_eq!(WeldType::parse("BUTT").unwrap(), WeldType::Butt);
        assert_eq!(OversightStatus::NotApplicable.as_str(), "na");
        assert_eq!(
            SwpppInspectionType::parse("precip").unwrap(),
            SwpppInspectionType::Precipitation
        );
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(SurfaceType::parse("glass").is_err());
        assert!(WeldType::parse("butt").is_err());
        assert!(UtilityType::parse("").is_err());
    }
}

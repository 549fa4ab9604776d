use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AdmissionOutcome {
    DischargedAlive => "discharged_alive",
    Deceased => "deceased",
    Transferred => "transferred",
    Unknown => "unknown",
});

str_enum!(DeviceKind {
    Ventilator => "ventilator",
    Catheter => "catheter",
    UrinaryCatheter => "urinary_catheter",
    ArterialLine => "arterial_line",
});

str_enum!(LabFlag {
    Normal => "normal",
    High => "high",
    Low => "low",
    Acidosis => "acidosis",
    Alkalosis => "alkalosis",
});

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn outcome_round_trips_through_str() {
        for outcome in [
            AdmissionOutcome::DischargedAlive,
            AdmissionOutcome::Deceased,
            AdmissionOutcome::Transferred,
            AdmissionOutcome::Unknown,
        ] {
            assert_eq!(AdmissionOutcome::from_str(outcome.as_str()).unwrap(), outcome);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = AdmissionOutcome::from_str("eloped").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }
}

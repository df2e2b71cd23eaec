//! Record sampling settings

use serde::{Deserialize, Serialize};

/// How many rows to sample from each table.
///
/// `Absolute` asks for a fixed row count and clamps to the rows actually
/// available; `Relative` asks for a percentage of the table, which must
/// lie in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SamplingSettings {
    /// Fixed row count, clamped to the table size
    Absolute { value: u64 },

    /// Percentage of the table's rows
    Relative { percent: f64 },
}

impl SamplingSettings {
    /// Check the invariants that cannot be expressed in the type.
    ///
    /// Returns the offending percentage when a relative setting falls
    /// outside `0..=100`. Absolute settings are always valid since excess
    /// counts clamp instead of erroring.
    pub fn validate(&self) -> Result<(), f64> {
        match self {
            Self::Absolute { .. } => Ok(()),
            Self::Relative { percent } => {
                if (0.0..=100.0).contains(percent) {
                    Ok(())
                } else {
                    Err(*percent)
                }
            }
        }
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self::Absolute { value: 1000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_range_validation() {
        assert!(SamplingSettings::Relative { percent: 0.0 }.validate().is_ok());
        assert!(SamplingSettings::Relative { percent: 100.0 }.validate().is_ok());
        assert!(SamplingSettings::Relative { percent: 100.1 }.validate().is_err());
        assert!(SamplingSettings::Relative { percent: -1.0 }.validate().is_err());
        assert!(SamplingSettings::Absolute { value: u64::MAX }.validate().is_ok());
    }

    #[test]
    fn settings_deserialize_tagged() {
        let absolute: SamplingSettings =
            serde_json::from_value(serde_json::json!({"mode": "absolute", "value": 50})).unwrap();
        assert_eq!(absolute, SamplingSettings::Absolute { value: 50 });

        let relative: SamplingSettings =
            serde_json::from_value(serde_json::json!({"mode": "relative", "percent": 25.0}))
                .unwrap();
        assert_eq!(relative, SamplingSettings::Relative { percent: 25.0 });
    }
}

//! Sampling policy
//!
//! Turns [`SamplingSettings`] plus a table's row count into the number of
//! rows to fetch. Absolute counts clamp to the table size; relative
//! percentages round to the nearest row.

use schemalift_core::SamplingSettings;

/// Sampling policy errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("sampling percentage {0} is outside the range 0..=100")]
    InvalidPercentage(f64),
}

/// Compute how many rows to sample from a table.
///
/// - Absolute mode returns the configured value, clamped to
///   `0..=total_rows`. Asking for more rows than exist is not an error.
/// - Relative mode returns `round(total_rows * percent / 100)` and
///   rejects percentages outside `0..=100`.
pub fn compute_sample_size(
    total_rows: u64,
    settings: &SamplingSettings,
) -> Result<u64, SamplingError> {
    match settings {
        SamplingSettings::Absolute { value } => Ok((*value).min(total_rows)),
        SamplingSettings::Relative { percent } => {
            settings
                .validate()
                .map_err(SamplingError::InvalidPercentage)?;
            Ok((total_rows as f64 * percent / 100.0).round() as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_within_total_returns_value() {
        let settings = SamplingSettings::Absolute { value: 100 };
        assert_eq!(compute_sample_size(1000, &settings).unwrap(), 100);
    }

    #[test]
    fn absolute_above_total_clamps() {
        let settings = SamplingSettings::Absolute { value: 5000 };
        assert_eq!(compute_sample_size(1000, &settings).unwrap(), 1000);
    }

    #[test]
    fn absolute_zero_rows() {
        let settings = SamplingSettings::Absolute { value: 100 };
        assert_eq!(compute_sample_size(0, &settings).unwrap(), 0);
    }

    #[test]
    fn relative_full_table() {
        let settings = SamplingSettings::Relative { percent: 100.0 };
        assert_eq!(compute_sample_size(1000, &settings).unwrap(), 1000);
        assert_eq!(compute_sample_size(7, &settings).unwrap(), 7);
    }

    #[test]
    fn relative_rounds_to_nearest_row() {
        let settings = SamplingSettings::Relative { percent: 10.0 };
        assert_eq!(compute_sample_size(1000, &settings).unwrap(), 100);

        // 2.5% of 100 rows rounds half-up
        let settings = SamplingSettings::Relative { percent: 2.5 };
        assert_eq!(compute_sample_size(100, &settings).unwrap(), 3);
    }

    #[test]
    fn relative_zero_percent() {
        let settings = SamplingSettings::Relative { percent: 0.0 };
        assert_eq!(compute_sample_size(1000, &settings).unwrap(), 0);
    }

    #[test]
    fn relative_out_of_range_is_rejected() {
        let settings = SamplingSettings::Relative { percent: 150.0 };
        assert_eq!(
            compute_sample_size(1000, &settings),
            Err(SamplingError::InvalidPercentage(150.0))
        );

        let settings = SamplingSettings::Relative { percent: -5.0 };
        assert!(compute_sample_size(1000, &settings).is_err());
    }
}

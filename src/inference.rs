use crate::features::FeatureRecord;
use crate::model::Estimator;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("{0:#}")]
    Estimator(anyhow::Error),
    #[error("model returned no output")]
    EmptyOutput,
    #[error("model output {0} is not a number")]
    NotFinite(f64),
    #[error("model output {0} does not fit in a count")]
    OutOfRange(f64),
}

pub type PredictionResult = Result<i64, PredictionError>;

/// Runs the estimator on one record and truncates its first output to a
/// count. Every failure is returned as a value.
pub fn predict(estimator: &dyn Estimator, record: &FeatureRecord) -> PredictionResult {
    let out = estimator
        .predict(&record.to_vec())
        .map_err(PredictionError::Estimator)?;
    let value = *out.first().ok_or(PredictionError::EmptyOutput)?;
    if !value.is_finite() {
        return Err(PredictionError::NotFinite(value));
    }
    if value.abs() >= i64::MAX as f64 {
        return Err(PredictionError::OutOfRange(value));
    }
    Ok(value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawInputs, Season, Weather};
    use anyhow::bail;
    use chrono::NaiveDate;

    struct Fixed(Vec<f64>);

    impl Estimator for Fixed {
        fn in_dim(&self) -> usize {
            8
        }

        fn predict(&self, _x: &[f64]) -> anyhow::Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    struct Narrow;

    impl Estimator for Narrow {
        fn in_dim(&self) -> usize {
            7
        }

        fn predict(&self, x: &[f64]) -> anyhow::Result<Vec<f64>> {
            bail!("feature length mismatch: got {}, expected {}", x.len(), self.in_dim())
        }
    }

    fn record() -> FeatureRecord {
        let raw = RawInputs {
            hour: 12,
            temp: 20.0,
            season: Season::Fall,
            working_day: true,
            weather: Weather::Clear,
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            month: "June".into(),
        };
        FeatureRecord::build(&raw, 15, 6, 2025)
    }

    #[test]
    fn truncates_first_output() {
        assert_eq!(predict(&Fixed(vec![42.7]), &record()).unwrap(), 42);
        assert_eq!(predict(&Fixed(vec![99.999, 3.0]), &record()).unwrap(), 99);
        // not clamped
        assert_eq!(predict(&Fixed(vec![-3.9]), &record()).unwrap(), -3);
    }

    #[test]
    fn shape_mismatch_is_a_value() {
        let err = predict(&Narrow, &record()).unwrap_err();
        assert!(matches!(err, PredictionError::Estimator(_)));
        assert_eq!(err.to_string(), "feature length mismatch: got 8, expected 7");
    }

    #[test]
    fn empty_and_nan_outputs_fail() {
        assert!(matches!(
            predict(&Fixed(vec![]), &record()),
            Err(PredictionError::EmptyOutput)
        ));
        assert!(matches!(
            predict(&Fixed(vec![f64::NAN]), &record()),
            Err(PredictionError::NotFinite(_))
        ));
        assert!(matches!(
            predict(&Fixed(vec![f64::INFINITY]), &record()),
            Err(PredictionError::NotFinite(_))
        ));
    }

    #[test]
    fn huge_finite_output_is_out_of_range() {
        let err = predict(&Fixed(vec![1e19]), &record()).unwrap_err();
        assert!(matches!(err, PredictionError::OutOfRange(_)));
        assert_eq!(err.to_string(), "model output 10000000000000000000 does not fit in a count");
        assert!(matches!(
            predict(&Fixed(vec![-1e19]), &record()),
            Err(PredictionError::OutOfRange(_))
        ));
        // still within i64
        assert_eq!(predict(&Fixed(vec![1e15 + 0.5]), &record()).unwrap(), 1_000_000_000_000_000);
    }
}

use chrono::NaiveDate;

use crate::date;
use crate::features::FeatureRecord;
use crate::inference::{self, PredictionError};
use crate::model::Estimator;
use crate::present::{self, FlatEntry, RadarPoint};
use crate::types::{InputError, RawInputs};

/// A successful run: the count plus chart data built from the record the
/// model was fed.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub record: FeatureRecord,
    pub count: i64,
    pub message: String,
    pub flat: Vec<FlatEntry>,
    pub radar: Vec<RadarPoint>,
}

/// An estimator failure. Carries no chart data.
#[derive(Debug)]
pub struct Failure {
    pub record: FeatureRecord,
    pub error: PredictionError,
}

impl Failure {
    pub fn message(&self) -> String {
        present::failure_message(&self.error)
    }
}

#[derive(Debug)]
pub enum Outcome {
    Predicted(Prediction),
    Failed(Failure),
}

/// The record the model would see for `inputs`, or why the picked month is
/// not allowed for the picked date.
pub fn feature_record(inputs: &RawInputs, today: NaiveDate) -> Result<FeatureRecord, InputError> {
    let parts = date::decompose(inputs.date, today);
    let month = parts
        .resolve_month(&inputs.month)
        .ok_or_else(|| InputError::MonthNotAllowed {
            month: inputs.month.clone(),
            date: inputs.date,
        })?;
    Ok(FeatureRecord::build(inputs, parts.day, month, parts.year))
}

/// One predict action: decompose, build, invoke, present.
pub fn run(
    inputs: &RawInputs,
    today: NaiveDate,
    estimator: &dyn Estimator,
) -> Result<Outcome, InputError> {
    let record = feature_record(inputs, today)?;
    let outcome = match inference::predict(estimator, &record) {
        Ok(count) => Outcome::Predicted(Prediction {
            count,
            message: present::success_message(count),
            flat: present::flat_view(&record),
            radar: present::radar_view(&record),
            record,
        }),
        Err(error) => Outcome::Failed(Failure { record, error }),
    };
    Ok(outcome)
}

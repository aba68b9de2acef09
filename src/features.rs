use crate::types::RawInputs;

/// Year the model's training data starts at; the model sees years as an
/// offset from it.
pub const YEAR_EPOCH: i32 = 2011;

/// Column names in the exact order the estimator was trained on.
/// Positions are load-bearing: the model reads inputs by index.
pub const FEATURE_SCHEMA: [&str; 8] = [
    "season",
    "workingday",
    "weather",
    "temp",
    "hour",
    "day",
    "year",
    "month",
];

pub const N_FEATURES: usize = FEATURE_SCHEMA.len();

/// One feature column, in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Season,
    WorkingDay,
    Weather,
    Temp,
    Hour,
    Day,
    Year,
    Month,
}

impl Feature {
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::Season,
        Feature::WorkingDay,
        Feature::Weather,
        Feature::Temp,
        Feature::Hour,
        Feature::Day,
        Feature::Year,
        Feature::Month,
    ];

    pub fn column(self) -> &'static str {
        FEATURE_SCHEMA[self.index()]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub fn normalize_year(year: i32) -> i32 {
    year - YEAR_EPOCH
}

/// The fixed-order numeric encoding handed to the estimator.
///
/// Built once per prediction and never mutated; the presenter reads the same
/// instance the estimator was fed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    season: u8,
    workingday: u8,
    weather: u8,
    temp: f64,
    hour: u8,
    day: u32,
    year: i32,
    month: u32,
}

impl FeatureRecord {
    /// Codes pass through unchanged; only the year is shifted to the
    /// training epoch.
    pub fn build(inputs: &RawInputs, day: u32, month: u32, year: i32) -> Self {
        Self {
            season: inputs.season.code(),
            workingday: u8::from(inputs.working_day),
            weather: inputs.weather.code(),
            temp: inputs.temp,
            hour: inputs.hour,
            day,
            year: normalize_year(year),
            month,
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Season => f64::from(self.season),
            Feature::WorkingDay => f64::from(self.workingday),
            Feature::Weather => f64::from(self.weather),
            Feature::Temp => self.temp,
            Feature::Hour => f64::from(self.hour),
            Feature::Day => f64::from(self.day),
            Feature::Year => f64::from(self.year),
            Feature::Month => f64::from(self.month),
        }
    }

    /// `(feature, value)` pairs in training order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    /// Values laid out in training order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().map(|(_, v)| v).collect()
    }

    pub fn normalized_year(&self) -> i32 {
        self.year
    }
}

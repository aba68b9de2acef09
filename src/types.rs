use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::MONTHS;
use crate::present::{FlatEntry, RadarPoint};

// ---------- Form option sets ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring = 1,
    Summer = 2,
    Fall = 3,
    Winter = 4,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weather {
    Clear = 1,
    MistCloudy = 2,
    LightRainSnow = 3,
    HeavyRainSnow = 4,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::Clear,
        Weather::MistCloudy,
        Weather::LightRainSnow,
        Weather::HeavyRainSnow,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Weather::Clear => "☀️ Clear",
            Weather::MistCloudy => "🌫️ Mist / Cloudy",
            Weather::LightRainSnow => "🌧️ Light Rain / Snow",
            Weather::HeavyRainSnow => "⛈️ Heavy Rain / Snow",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.code() == code)
    }
}

pub const DEFAULT_HOUR: u8 = 12;
pub const MAX_HOUR: u8 = 23;
pub const DEFAULT_TEMP_C: f64 = 20.0;
pub const TEMP_STEP_C: f64 = 0.1;

// ---------- Validated inputs ----------

/// One render cycle's worth of form inputs, already range-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInputs {
    pub hour: u8,
    pub temp: f64,
    pub season: Season,
    pub working_day: bool,
    pub weather: Weather,
    pub date: NaiveDate,
    /// Month name as picked from the legal month range.
    pub month: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InputError {
    #[error("hour must be between 0 and 23, got {0}")]
    HourOutOfRange(i64),
    #[error("unknown season code {0}")]
    UnknownSeason(u8),
    #[error("unknown weather code {0}")]
    UnknownWeather(u8),
    #[error("date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("month {month:?} is not selectable for {date}")]
    MonthNotAllowed { month: String, date: NaiveDate },
}

// ---------- Request/Response types ----------

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub hour: i64,
    pub temp: f64,
    pub season: u8,
    pub workingday: bool,
    pub weather: u8,
    pub date: NaiveDate,
    pub month: String,
}

impl PredictRequest {
    /// Applies the form's own constraints. The month name is checked later,
    /// against the legal range derived from `date`.
    pub fn validate(self, today: NaiveDate) -> Result<RawInputs, InputError> {
        let hour = u8::try_from(self.hour)
            .ok()
            .filter(|h| *h <= MAX_HOUR)
            .ok_or(InputError::HourOutOfRange(self.hour))?;
        let season = Season::from_code(self.season).ok_or(InputError::UnknownSeason(self.season))?;
        let weather =
            Weather::from_code(self.weather).ok_or(InputError::UnknownWeather(self.weather))?;
        if self.date < today {
            return Err(InputError::DateInPast { date: self.date, today });
        }
        Ok(RawInputs {
            hour,
            temp: self.temp,
            season,
            working_day: self.workingday,
            weather,
            date: self.date,
            month: self.month,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: i64,
    pub message: String,
    /// Values sent to the estimator, keyed by column, in training order.
    pub features: Vec<(&'static str, f64)>,
    pub flat: Vec<FlatEntry>,
    pub radar: Vec<RadarPoint>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct MonthsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct OptionEntry<T> {
    pub label: &'static str,
    pub value: T,
}

/// Everything a form needs to render its widgets.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub today: NaiveDate,
    pub hour: HourOptions,
    pub temp: TempOptions,
    pub seasons: Vec<OptionEntry<u8>>,
    pub workingday: Vec<OptionEntry<bool>>,
    pub weather: Vec<OptionEntry<u8>>,
    pub months: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HourOptions {
    pub min: u8,
    pub max: u8,
    pub default: u8,
}

#[derive(Debug, Serialize)]
pub struct TempOptions {
    pub default: f64,
    pub step: f64,
}

impl FormOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            hour: HourOptions { min: 0, max: MAX_HOUR, default: DEFAULT_HOUR },
            temp: TempOptions { default: DEFAULT_TEMP_C, step: TEMP_STEP_C },
            seasons: Season::ALL
                .iter()
                .map(|s| OptionEntry { label: s.label(), value: s.code() })
                .collect(),
            workingday: vec![
                OptionEntry { label: "No", value: false },
                OptionEntry { label: "Yes", value: true },
            ],
            weather: Weather::ALL
                .iter()
                .map(|w| OptionEntry { label: w.label(), value: w.code() })
                .collect(),
            months: MONTHS.to_vec(),
        }
    }
}

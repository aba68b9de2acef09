//! Chart datasets derived from the feature record that was sent to the model.
//!
//! Values are shown exactly as the model saw them. No per-field scaling is
//! applied, so the radar chart overlays hours, degrees and category codes on
//! one axis.

use std::f64::consts::TAU;

use serde::Serialize;

use crate::features::{Feature, FeatureRecord};

/// Display order and labels for the summary charts.
pub const DISPLAY_ORDER: [(Feature, &str); 8] = [
    (Feature::Hour, "Hour"),
    (Feature::Temp, "Temperature (°C)"),
    (Feature::Season, "Season"),
    (Feature::WorkingDay, "Working Day"),
    (Feature::Weather, "Weather"),
    (Feature::Day, "Day"),
    (Feature::Month, "Month"),
    (Feature::Year, "Year"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatEntry {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub label: &'static str,
    /// Radians, counter-clockwise from the first axis.
    pub angle: f64,
    pub value: f64,
}

/// Bar-chart data: one labelled value per feature.
pub fn flat_view(record: &FeatureRecord) -> Vec<FlatEntry> {
    DISPLAY_ORDER
        .iter()
        .map(|&(feature, label)| FlatEntry { label, value: record.get(feature) })
        .collect()
}

/// Radar-chart polygon. The first vertex is repeated at the end so the
/// outline closes; `len() == DISPLAY_ORDER.len() + 1`.
pub fn radar_view(record: &FeatureRecord) -> Vec<RadarPoint> {
    let n = DISPLAY_ORDER.len();
    let mut points: Vec<RadarPoint> = flat_view(record)
        .into_iter()
        .enumerate()
        .map(|(i, e)| RadarPoint {
            label: e.label,
            angle: TAU * i as f64 / n as f64,
            value: e.value,
        })
        .collect();
    if let Some(first) = points.first().cloned() {
        points.push(first);
    }
    points
}

pub fn success_message(prediction: i64) -> String {
    format!("🚴 Estimated Rentals: {prediction} bikes")
}

pub fn failure_message(cause: &impl std::fmt::Display) -> String {
    format!("❌ Prediction failed: {cause}")
}

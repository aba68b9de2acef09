use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, sync::Arc};
use tch::{kind::Kind, CModule, Device, Tensor};

use crate::features::FEATURE_SCHEMA;

/// Companion metadata shipped next to the exported model.
#[derive(Debug, Deserialize)]
pub struct MetaJson {
    pub feat_list: Vec<String>,
    pub in_dim: Option<usize>,
}

impl MetaJson {
    pub fn load(meta_path: &Path) -> Result<Self> {
        let meta_txt = fs::read_to_string(meta_path)
            .with_context(|| format!("failed to read meta at {}", meta_path.display()))?;
        serde_json::from_str(&meta_txt).with_context(|| "failed to parse meta.json")
    }

    pub fn in_dim(&self) -> usize {
        self.in_dim.unwrap_or(self.feat_list.len())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("model expects {got} inputs, feature record has {expected}")]
    WidthMismatch { got: usize, expected: usize },
    #[error("column {position} is {got:?} in model meta, expected {expected:?}")]
    ColumnMismatch {
        position: usize,
        expected: &'static str,
        got: String,
    },
}

/// Checks that the artifact was trained on exactly our columns, in our order.
pub fn validate_schema(feat_list: &[String], in_dim: usize) -> Result<(), SchemaError> {
    if in_dim != FEATURE_SCHEMA.len() || feat_list.len() != FEATURE_SCHEMA.len() {
        let got = if in_dim != FEATURE_SCHEMA.len() { in_dim } else { feat_list.len() };
        return Err(SchemaError::WidthMismatch { got, expected: FEATURE_SCHEMA.len() });
    }
    for (position, (expected, got)) in FEATURE_SCHEMA.into_iter().zip(feat_list).enumerate() {
        if expected != got.as_str() {
            return Err(SchemaError::ColumnMismatch {
                position,
                expected,
                got: got.clone(),
            });
        }
    }
    Ok(())
}

/// A loaded regression model: one ordered feature row in, predictions out.
pub trait Estimator: Send + Sync {
    fn in_dim(&self) -> usize;

    /// Raw model output for a single row, flattened.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>>;
}

/// TorchScript-exported regressor.
pub struct TorchEstimator {
    model: CModule,
    device: Device,
    in_dim: usize,
}

impl TorchEstimator {
    /// Loads meta + model, validates the column schema and probes the output
    /// shape. Any failure here is fatal for the service.
    pub fn load(model_path: &Path, meta_path: &Path) -> Result<Self> {
        let device = Device::Cpu;

        let meta = MetaJson::load(meta_path)?;
        let in_dim = meta.in_dim();
        validate_schema(&meta.feat_list, in_dim)
            .with_context(|| format!("meta at {} does not match feature schema", meta_path.display()))?;

        let model = CModule::load_on_device(model_path, device)
            .with_context(|| format!("failed to load TorchScript {}", model_path.display()))?;

        // Probe output shape with a dummy forward; expect a single value for a single row
        let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
        let t = model.forward_ts(&[dummy])?;
        let sz = t.size();
        if t.numel() != 1 || sz.first().is_some_and(|b| *b != 1) {
            bail!("unexpected model output size: {:?}", sz);
        }

        Ok(Self { model, device, in_dim })
    }
}

impl Estimator for TorchEstimator {
    fn in_dim(&self) -> usize {
        self.in_dim
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.in_dim {
            bail!(
                "feature length mismatch: got {}, expected {}",
                x.len(),
                self.in_dim
            );
        }

        let row: Vec<f32> = x.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(&row)
            .reshape([1, self.in_dim as i64])
            .to_device(self.device);

        let out = self.model.forward_ts(&[input])?.flatten(0, -1);
        let n = out.size().first().copied().unwrap_or(0);
        (0..n)
            .map(|i| out.f_double_value(&[i]).map_err(anyhow::Error::from))
            .collect()
    }
}

/// Process-wide, read-only access to the loaded estimator.
#[derive(Clone)]
pub struct ModelHandle(Arc<dyn Estimator>);

impl ModelHandle {
    pub fn new(estimator: impl Estimator + 'static) -> Self {
        Self(Arc::new(estimator))
    }

    pub fn estimator(&self) -> &dyn Estimator {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<String> {
        FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matching_schema_passes() {
        assert_eq!(validate_schema(&schema(), 8), Ok(()));
    }

    #[test]
    fn swapped_columns_fail() {
        let mut feats = schema();
        feats.swap(6, 7);
        assert_eq!(
            validate_schema(&feats, 8),
            Err(SchemaError::ColumnMismatch {
                position: 6,
                expected: "year",
                got: "month".into(),
            })
        );
    }

    #[test]
    fn width_mismatch_fails() {
        assert!(matches!(
            validate_schema(&schema(), 9),
            Err(SchemaError::WidthMismatch { got: 9, expected: 8 })
        ));
        let mut feats = schema();
        feats.pop();
        assert!(matches!(
            validate_schema(&feats, 8),
            Err(SchemaError::WidthMismatch { got: 7, expected: 8 })
        ));
    }

    #[test]
    fn meta_in_dim_defaults_to_feat_list() {
        let meta: MetaJson = serde_json::from_str(r#"{"feat_list":["a","b"]}"#).unwrap();
        assert_eq!(meta.in_dim(), 2);
        let meta: MetaJson = serde_json::from_str(r#"{"feat_list":["a"],"in_dim":3}"#).unwrap();
        assert_eq!(meta.in_dim(), 3);
    }
}

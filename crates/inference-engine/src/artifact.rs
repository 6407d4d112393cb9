//! Model Artifacts
//!
//! Regressor and scaler parameters travel through the registry as postcard
//! payloads. A `ModelSpec` JSON document is the import format for models
//! trained outside this workspace.

use crate::model::{FeatureScaler, IdentityScaler, LinearRegressor, Regressor, StandardScaler};
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use storage::NewModel;

/// Serialized regressor parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelPayload {
    Linear { coefficients: Vec<f64>, intercept: f64 },
}

impl ModelPayload {
    pub fn encode(&self) -> Result<Vec<u8>, InferenceError> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, InferenceError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn n_features(&self) -> usize {
        match self {
            ModelPayload::Linear { coefficients, .. } => coefficients.len(),
        }
    }

    pub fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelPayload::Linear {
                coefficients,
                intercept,
            } => Box::new(LinearRegressor::new(coefficients, intercept)),
        }
    }
}

/// Serialized scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerPayload {
    Identity,
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

impl ScalerPayload {
    pub fn encode(&self) -> Result<Vec<u8>, InferenceError> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, InferenceError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn into_scaler(self) -> Result<Box<dyn FeatureScaler>, InferenceError> {
        Ok(match self {
            ScalerPayload::Identity => Box::new(IdentityScaler),
            ScalerPayload::Standard { mean, scale } => Box::new(StandardScaler::new(mean, scale)?),
        })
    }
}

/// Importable description of an externally trained linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scaler_scale: Option<Vec<f64>>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub training_info: BTreeMap<String, Value>,
}

impl ModelSpec {
    pub fn from_json(text: &str) -> Result<Self, InferenceError> {
        let spec: Self = serde_json::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Every parameter vector must match the feature list
    pub fn validate(&self) -> Result<(), InferenceError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(InferenceError::InvalidSpec("feature_names is empty".into()));
        }
        if self.coefficients.len() != n {
            return Err(InferenceError::InvalidSpec(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                n
            )));
        }
        match (&self.scaler_mean, &self.scaler_scale) {
            (None, None) => {}
            (Some(mean), Some(scale)) if mean.len() == n && scale.len() == n => {}
            (Some(_), Some(_)) => {
                return Err(InferenceError::InvalidSpec(format!(
                    "scaler parameters must have {} entries",
                    n
                )))
            }
            _ => {
                return Err(InferenceError::InvalidSpec(
                    "scaler_mean and scaler_scale must be given together".into(),
                ))
            }
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::InvalidSpec("non-finite model parameter".into()));
        }
        Ok(())
    }

    pub fn model_payload(&self) -> ModelPayload {
        ModelPayload::Linear {
            coefficients: self.coefficients.clone(),
            intercept: self.intercept,
        }
    }

    pub fn scaler_payload(&self) -> ScalerPayload {
        match (&self.scaler_mean, &self.scaler_scale) {
            (Some(mean), Some(scale)) => ScalerPayload::Standard {
                mean: mean.clone(),
                scale: scale.clone(),
            },
            _ => ScalerPayload::Identity,
        }
    }

    /// Encode into a registry entry; `default_version` applies when the spec has none
    pub fn into_new_model(self, default_version: String) -> Result<NewModel, InferenceError> {
        self.validate()?;
        Ok(NewModel {
            model_bytes: self.model_payload().encode()?,
            scaler_bytes: self.scaler_payload().encode()?,
            version: self.version.unwrap_or(default_version),
            model_name: self.name,
            feature_names: self.feature_names,
            performance: self.metrics,
            training_info: self.training_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const SPEC: &str = r#"{
        "name": "ridge",
        "feature_names": ["pm2_5", "hour"],
        "coefficients": [2.0, 0.5],
        "intercept": 5.0,
        "scaler_mean": [10.0, 12.0],
        "scaler_scale": [5.0, 6.0],
        "metrics": {"test_rmse": 8.1}
    }"#;

    #[test]
    fn test_payload_codec() {
        let payload = ModelPayload::Linear {
            coefficients: vec![0.25, -1.5],
            intercept: 3.0,
        };
        let bytes = payload.encode().unwrap();
        assert_eq!(ModelPayload::decode(&bytes).unwrap(), payload);
        assert!(ScalerPayload::decode(&[0xff, 0xff]).is_err());
    }

    #[test]
    fn test_spec_to_new_model() {
        let spec = ModelSpec::from_json(SPEC).unwrap();
        let model = spec.into_new_model("v7".into()).unwrap();
        assert_eq!(model.version, "v7");
        assert_eq!(model.feature_names.len(), 2);
        assert_eq!(model.performance["test_rmse"], 8.1);

        let scaler = ScalerPayload::decode(&model.scaler_bytes)
            .unwrap()
            .into_scaler()
            .unwrap();
        let regressor = ModelPayload::decode(&model.model_bytes).unwrap().into_regressor();
        let x = scaler.transform(&array![[20.0, 18.0]]).unwrap();
        // (20-10)/5 = 2, (18-12)/6 = 1 -> 2*2 + 0.5*1 + 5
        assert_eq!(regressor.predict(&x).unwrap()[0], 9.5);
    }

    #[test]
    fn test_spec_validation() {
        let bad = SPEC.replace("[2.0, 0.5]", "[2.0]");
        assert!(matches!(
            ModelSpec::from_json(&bad),
            Err(InferenceError::InvalidSpec(_))
        ));

        let half_scaler = SPEC.replace(r#""scaler_scale": [5.0, 6.0],"#, "");
        assert!(ModelSpec::from_json(&half_scaler).is_err());
    }

    #[test]
    fn test_spec_without_scaler_uses_identity() {
        let raw = SPEC
            .replace(r#""scaler_mean": [10.0, 12.0],"#, "")
            .replace(r#""scaler_scale": [5.0, 6.0],"#, "");
        let spec = ModelSpec::from_json(&raw).unwrap();
        assert_eq!(spec.scaler_payload(), ScalerPayload::Identity);
    }
}

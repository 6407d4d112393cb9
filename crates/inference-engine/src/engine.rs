//! Inference Engine Implementation

use crate::artifact::{ModelPayload, ScalerPayload};
use crate::model::{FeatureScaler, Regressor};
use crate::InferenceError;
use ndarray::Array2;
use observation::FeatureRow;
use storage::{ModelDocument, ModelRegistry};
use tracing::{debug, info};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A loaded model: scaler, regressor and the ordered columns they expect
pub struct InferenceEngine {
    regressor: Box<dyn Regressor>,
    scaler: Box<dyn FeatureScaler>,
    feature_names: Vec<String>,
    model_name: String,
    version: String,
}

impl InferenceEngine {
    /// Create an engine; the regressor width must match the feature list
    pub fn new(
        regressor: Box<dyn Regressor>,
        scaler: Box<dyn FeatureScaler>,
        feature_names: Vec<String>,
        model_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, InferenceError> {
        if regressor.n_features() != feature_names.len() {
            return Err(InferenceError::ModelLoadError(format!(
                "regressor expects {} features, feature list has {}",
                regressor.n_features(),
                feature_names.len()
            )));
        }
        Ok(Self {
            regressor,
            scaler,
            feature_names,
            model_name: model_name.into(),
            version: version.into(),
        })
    }

    /// Decode a registry document
    pub fn from_document(doc: &ModelDocument) -> Result<Self, InferenceError> {
        let regressor = ModelPayload::decode(&doc.model_bytes)?.into_regressor();
        let scaler = ScalerPayload::decode(&doc.scaler_bytes)?.into_scaler()?;
        info!(
            "Loaded {} {} with {} features",
            doc.model_name,
            doc.version,
            doc.feature_names.len()
        );
        Self::new(
            regressor,
            scaler,
            doc.feature_names.clone(),
            doc.model_name.clone(),
            doc.version.clone(),
        )
    }

    /// Load the registry's active model; fails when none is active
    pub fn from_registry<R: ModelRegistry + ?Sized>(registry: &R) -> Result<Self, InferenceError> {
        let doc = registry.load_active()?.ok_or(InferenceError::NoActiveModel)?;
        Self::from_document(&doc)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Select the trained columns, in training order, from each row
    pub fn feature_matrix(&self, rows: &[FeatureRow]) -> Result<Array2<f64>, InferenceError> {
        let width = self.feature_names.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for row in rows {
            for name in &self.feature_names {
                let value = row
                    .get(name)
                    .ok_or_else(|| InferenceError::MissingFeature { name: name.clone() })?;
                values.push(value);
            }
        }
        Array2::from_shape_vec((rows.len(), width), values).map_err(|e| {
            InferenceError::InvalidInputShape {
                expected: format!("[{}, {}]", rows.len(), width),
                actual: e.to_string(),
            }
        })
    }

    /// Scale, predict and round every row
    pub fn predict_rows(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, InferenceError> {
        let x = self.feature_matrix(rows)?;
        let scaled = self.scaler.transform(&x)?;
        let predictions = self.regressor.predict(&scaled)?;

        let mut out = Vec::with_capacity(predictions.len());
        for (row, &p) in rows.iter().zip(predictions.iter()) {
            if !p.is_finite() {
                return Err(InferenceError::InferenceFailed(format!(
                    "non-finite prediction for {}",
                    row.timestamp
                )));
            }
            out.push(round2(p));
        }
        debug!("Predicted {} rows with {}", out.len(), self.model_name);
        Ok(out)
    }

    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        let predictions = self.predict_rows(std::slice::from_ref(row))?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("empty prediction".into()))
    }
}

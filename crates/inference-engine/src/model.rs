//! Regressor and Scaler Contract

use crate::InferenceError;
use ndarray::{Array1, Array2, Axis};

/// Fitted regressor: one prediction per input row
pub trait Regressor {
    fn n_features(&self) -> usize;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, InferenceError>;
}

/// Fitted feature scaler applied before the regressor
pub trait FeatureScaler {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError>;
}

fn check_width(x: &Array2<f64>, expected: usize) -> Result<(), InferenceError> {
    if x.ncols() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("[n, {}]", expected),
            actual: format!("{:?}", x.shape()),
        });
    }
    Ok(())
}

/// Ordinary linear model `y = x · w + b`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients: Array1::from(coefficients),
            intercept,
        }
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, InferenceError> {
        check_width(x, self.n_features())?;
        Ok(x.dot(&self.coefficients) + self.intercept)
    }
}

/// Per-column standardisation `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// A zero (or non-finite) scale is treated as 1, leaving the column centred only
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, InferenceError> {
        if mean.len() != scale.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} scale values", mean.len()),
                actual: format!("{}", scale.len()),
            });
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s })
            .collect::<Vec<_>>();
        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        check_width(x, self.mean.len())?;
        let mean = self.mean.view().insert_axis(Axis(0));
        let scale = self.scale.view().insert_axis(Axis(0));
        Ok((x - &mean) / &scale)
    }
}

/// Pass-through scaler for models trained on raw features
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityScaler;

impl FeatureScaler for IdentityScaler {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        Ok(x.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_prediction() {
        let model = LinearRegressor::new(vec![2.0, -1.0], 10.0);
        let x = array![[1.0, 1.0], [3.0, 2.0]];
        assert_eq!(model.predict(&x).unwrap(), array![11.0, 14.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = LinearRegressor::new(vec![1.0, 1.0, 1.0], 0.0);
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict(&x),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = StandardScaler::new(vec![10.0, 5.0], vec![2.0, 0.0]).unwrap();
        let x = array![[14.0, 7.0], [10.0, 5.0]];
        let scaled = scaler.transform(&x).unwrap();
        assert_eq!(scaled, array![[2.0, 2.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_scaler_length_mismatch() {
        assert!(StandardScaler::new(vec![1.0, 2.0], vec![1.0]).is_err());
    }
}

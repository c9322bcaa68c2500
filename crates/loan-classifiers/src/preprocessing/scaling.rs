//! Per-feature standardization.
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};
use crate::schema::check_width;

/// Standard scaler (per-column mean/std), fitted on training rows only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl FeatureScaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;

    /// Fit on a matrix where rows are samples and columns are features.
    /// Uses the population standard deviation.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 || ncols == 0 {
            return Err(LoanError::EmptyDataset);
        }
        check_width(ncols)?;

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(LoanError::EmptyDataset)?
            .to_vec();

        let std = x
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(col, &m)| {
                let var = col.iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / nrows as f64;
                var.sqrt().max(Self::MIN_STD)
            })
            .collect();

        Ok(Self { mean, std })
    }

    /// Transform all rows and return a new matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_width(x.ncols())?;
        if self.mean.len() != x.ncols() || self.std.len() != x.ncols() {
            return Err(LoanError::SchemaMismatch {
                expected: format!("{} features", self.mean.len()),
                found: format!("{} features", x.ncols()),
            });
        }

        let mut out = x.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[c]) / self.std[c];
            }
        }
        Ok(out)
    }

    /// Fit and transform in one call.
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }
}

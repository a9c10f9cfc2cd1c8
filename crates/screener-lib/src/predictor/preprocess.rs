//! Feature preprocessing: mean imputation and standardization
//!
//! Both stages learn their parameters from the training subset only and are
//! frozen afterwards.

use crate::models::NUM_ITEMS;
use sha2::{Digest, Sha256};

/// A row of dense model features
pub type FeatureRow = [f64; NUM_ITEMS];

/// A row of raw features where `None` is a missing answer
pub type RawRow = [Option<f64>; NUM_ITEMS];

/// Replaces missing values with the per-feature training mean
#[derive(Debug, Clone, PartialEq)]
pub struct MeanImputer {
    means: FeatureRow,
}

impl MeanImputer {
    /// Learn per-feature means over present values.
    ///
    /// A feature with no present values imputes 0.
    pub fn fit(rows: &[RawRow]) -> Self {
        let mut sums = [0.0f64; NUM_ITEMS];
        let mut counts = [0usize; NUM_ITEMS];

        for row in rows {
            for (j, value) in row.iter().enumerate() {
                if let Some(v) = value {
                    sums[j] += v;
                    counts[j] += 1;
                }
            }
        }

        let means = std::array::from_fn(|j| {
            if counts[j] == 0 {
                0.0
            } else {
                sums[j] / counts[j] as f64
            }
        });

        Self { means }
    }

    pub fn means(&self) -> &FeatureRow {
        &self.means
    }

    pub fn transform(&self, row: &RawRow) -> FeatureRow {
        std::array::from_fn(|j| row[j].unwrap_or(self.means[j]))
    }

    pub(crate) fn digest(&self, hasher: &mut Sha256) {
        for m in self.means {
            hasher.update(m.to_le_bytes());
        }
    }
}

/// Centers each feature to zero mean and unit (population) variance
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: FeatureRow,
    scales: FeatureRow,
}

impl StandardScaler {
    /// Learn means and standard deviations.
    ///
    /// Zero-variance features get a scale of 1 so they map to 0.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let n = rows.len().max(1) as f64;

        let means: FeatureRow = std::array::from_fn(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n);
        let scales: FeatureRow = std::array::from_fn(|j| {
            let var = rows.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            if std < f64::EPSILON {
                1.0
            } else {
                std
            }
        });

        Self { means, scales }
    }

    pub fn means(&self) -> &FeatureRow {
        &self.means
    }

    pub fn scales(&self) -> &FeatureRow {
        &self.scales
    }

    pub fn transform(&self, row: &FeatureRow) -> FeatureRow {
        std::array::from_fn(|j| (row[j] - self.means[j]) / self.scales[j])
    }

    pub(crate) fn digest(&self, hasher: &mut Sha256) {
        for (m, s) in self.means.iter().zip(&self.scales) {
            hasher.update(m.to_le_bytes());
            hasher.update(s.to_le_bytes());
        }
    }
}

//! Admission-chance estimator.
//!
//! A logistic regression over `grade` and one-hot language level, persisted
//! together with the feature schema it was trained on. The serving process
//! loads one snapshot at startup and never mutates it.

pub mod features;
pub mod logistic;
pub mod training;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use features::{encode, FeatureSchema, LanguageLevel};
use logistic::LogisticRegression;

/// Grades the training data covers; anything outside is extrapolated.
pub const TRAINED_GRADE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=4.0;

/// Trained classifier plus the feature ordering it expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionModel {
    features: FeatureSchema,
    model: LogisticRegression,
    trained_at: DateTime<Utc>,
    test_accuracy: Option<f64>,
}

impl AdmissionModel {
    pub fn new(
        features: FeatureSchema,
        model: LogisticRegression,
        trained_at: DateTime<Utc>,
        test_accuracy: Option<f64>,
    ) -> Result<Self> {
        let bundle = Self {
            features,
            model,
            trained_at,
            test_accuracy,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    fn validate(&self) -> Result<()> {
        if self.model.coefficients.len() != self.features.len() {
            anyhow::bail!(
                "model has {} coefficients but the feature schema lists {}",
                self.model.coefficients.len(),
                self.features.len()
            );
        }
        if !self.model.intercept.is_finite() || self.model.coefficients.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("model parameters are not finite");
        }
        Ok(())
    }

    /// Load and validate a bundle written by [`AdmissionModel::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model bundle {}", path.display()))?;
        let bundle: Self = serde_json::from_str(&data)
            .with_context(|| format!("Model bundle {} is corrupt", path.display()))?;
        bundle
            .validate()
            .with_context(|| format!("Model bundle {} is inconsistent", path.display()))?;
        Ok(bundle)
    }

    /// Atomic write via temp file + rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn features(&self) -> &FeatureSchema {
        &self.features
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.model
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn test_accuracy(&self) -> Option<f64> {
        self.test_accuracy
    }

    /// Positive-class probability for one applicant.
    pub fn admit_probability(&self, grade: f64, language_level: LanguageLevel) -> f64 {
        let row = self.features.reindex(&encode(grade, language_level));
        self.model.predict_proba(&row)
    }

    /// Admission chance in whole percent, rounded half to even.
    ///
    /// Unknown language levels count as B2. Grades outside the trained range
    /// are not rejected.
    pub fn predict_chance_percent(&self, grade: f64, language_level: &str) -> u8 {
        if !TRAINED_GRADE_RANGE.contains(&grade) {
            tracing::warn!("Grade {grade} is outside the trained range; extrapolating");
        }
        let level = LanguageLevel::parse_lenient(language_level);
        let probability = self.admit_probability(grade, level);
        let percent = (probability * 100.0).round_ties_even();
        if percent.is_nan() {
            return 0;
        }
        percent.clamp(0.0, 100.0) as u8
    }
}

//! Synthetic admissions data and the offline training run.

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::TrainingConfig;
use crate::estimator::features::{encode, FeatureSchema, LanguageLevel};
use crate::estimator::logistic::{FitOptions, LogisticRegression};
use crate::estimator::AdmissionModel;

/// One synthetic applicant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applicant {
    pub grade: f64,
    pub language_level: LanguageLevel,
    pub admitted: bool,
}

/// Probability that an applicant is admitted under the labelling policy.
/// German grades: 1.0 is best, 4.0 is the lowest pass.
pub fn admit_rate(language_level: LanguageLevel, grade: f64) -> f64 {
    if language_level == LanguageLevel::B2 {
        return 0.0;
    }
    if grade <= 1.5 {
        0.95
    } else if grade <= 2.5 {
        0.70
    } else if grade <= 3.0 {
        0.20
    } else {
        0.0
    }
}

/// Draw `n` applicants: grade uniform in [1.0, 4.0] at one decimal, language
/// level uniform, label sampled from [`admit_rate`].
pub fn generate_applicants<R: Rng>(n: usize, rng: &mut R) -> Vec<Applicant> {
    (0..n)
        .map(|_| {
            let grade = (rng.random_range(1.0..=4.0_f64) * 10.0).round() / 10.0;
            let language_level = LanguageLevel::ALL[rng.random_range(0..LanguageLevel::ALL.len())];
            let admitted = rng.random::<f64>() < admit_rate(language_level, grade);
            Applicant {
                grade,
                language_level,
                admitted,
            }
        })
        .collect()
}

/// Shuffle and split into (train, test); the test side gets
/// `ceil(test_ratio * len)` items.
pub fn train_test_split<T, R: Rng>(mut items: Vec<T>, test_ratio: f64, rng: &mut R) -> (Vec<T>, Vec<T>) {
    items.shuffle(rng);
    let n_test = ((items.len() as f64) * test_ratio).ceil() as usize;
    let n_test = n_test.min(items.len());
    let test = items.split_off(items.len() - n_test);
    (items, test)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub test_accuracy: f64,
}

fn design_matrix(schema: &FeatureSchema, applicants: &[Applicant]) -> (Vec<Vec<f64>>, Vec<bool>) {
    applicants
        .iter()
        .map(|a| (schema.reindex(&encode(a.grade, a.language_level)), a.admitted))
        .unzip()
}

/// Generate data, fit on the training split and score on the held-out split.
pub fn train(config: &TrainingConfig) -> Result<(AdmissionModel, TrainingReport)> {
    if config.samples < 2 {
        anyhow::bail!("need at least 2 samples to train, got {}", config.samples);
    }
    tracing::info!("Generating {} synthetic admission samples", config.samples);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let applicants = generate_applicants(config.samples, &mut rng);
    let (train_set, test_set) = train_test_split(applicants, config.test_ratio, &mut rng);
    if train_set.is_empty() {
        anyhow::bail!("test ratio {} leaves no training data", config.test_ratio);
    }

    let schema = FeatureSchema::admission();
    let (x_train, y_train) = design_matrix(&schema, &train_set);
    let (x_test, y_test) = design_matrix(&schema, &test_set);

    let classifier = LogisticRegression::fit(&x_train, &y_train, FitOptions::default())?;
    let test_accuracy = classifier.accuracy(&x_test, &y_test);
    tracing::info!(
        "Model training complete. Test accuracy: {:.2}%",
        test_accuracy * 100.0
    );

    let report = TrainingReport {
        train_size: train_set.len(),
        test_size: test_set.len(),
        test_accuracy,
    };
    let model = AdmissionModel::new(schema, classifier, Utc::now(), Some(test_accuracy))?;
    Ok((model, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_rate_table() {
        assert_eq!(admit_rate(LanguageLevel::C1, 1.0), 0.95);
        assert_eq!(admit_rate(LanguageLevel::C2, 1.5), 0.95);
        assert_eq!(admit_rate(LanguageLevel::C1, 1.6), 0.70);
        assert_eq!(admit_rate(LanguageLevel::C2, 2.5), 0.70);
        assert_eq!(admit_rate(LanguageLevel::C1, 3.0), 0.20);
        assert_eq!(admit_rate(LanguageLevel::C1, 3.1), 0.0);
        assert_eq!(admit_rate(LanguageLevel::B2, 1.0), 0.0);
    }

    #[test]
    fn test_generated_grades_in_range_with_one_decimal() {
        let mut rng = StdRng::seed_from_u64(7);
        for a in generate_applicants(500, &mut rng) {
            assert!((1.0..=4.0).contains(&a.grade));
            assert!(((a.grade * 10.0).round() - a.grade * 10.0).abs() < 1e-9);
            if a.language_level == LanguageLevel::B2 || a.grade > 3.0 {
                assert!(!a.admitted);
            }
        }
    }

    #[test]
    fn test_split_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let (train, test) = train_test_split((0..2000).collect::<Vec<_>>(), 0.2, &mut rng);
        assert_eq!(train.len(), 1600);
        assert_eq!(test.len(), 400);

        let (train, test) = train_test_split((0..11).collect::<Vec<_>>(), 0.2, &mut rng);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_training_is_reproducible_for_a_seed() {
        let config = TrainingConfig::default();
        let (a, _) = train(&config).unwrap();
        let (b, _) = train(&config).unwrap();
        assert_eq!(a.classifier(), b.classifier());
    }

    #[test]
    fn test_trained_model_reflects_policy() {
        let (model, report) = train(&TrainingConfig::default()).unwrap();
        assert_eq!(report.train_size, 1600);
        assert_eq!(report.test_size, 400);
        assert!(report.test_accuracy > 0.7, "accuracy {}", report.test_accuracy);

        let coef = &model.classifier().coefficients;
        assert!(coef[0] < 0.0, "better (lower) grades should raise the odds");
        assert!(coef[1] > 0.0 && coef[2] > 0.0, "C1/C2 should beat B2");
    }

    #[test]
    fn test_too_few_samples() {
        let config = TrainingConfig {
            samples: 1,
            ..TrainingConfig::default()
        };
        assert!(train(&config).is_err());
    }
}

//! Per-request prediction pipeline.
//!
//! `run` is a pure function of the record, the shared bundle and the options:
//! the model path (features -> classifier -> label) and the rule path (raw
//! fields -> rule score) both read the same [`Ratios`], and nothing outlives
//! the call except the returned [`Assessment`].

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::artifact::ArtifactBundle;
use crate::features::{
    align_with_policy, engineer, one_hot_encode, Alignment, EncodingError, FeatureMatrix, Ratios,
    UnseenCategoryPolicy,
};
use crate::input::RawInput;
use crate::scoring::{score_rules, RuleConfig, RuleResult};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("feature matrix has {actual} columns but the classifier expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("classifier produced code {code} but the label encoder only knows {classes} classes")]
    UnknownClassCode { code: usize, classes: usize },
}

/// Request-independent knobs, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub unseen_categories: UnseenCategoryPolicy,
    pub rules: RuleConfig,
}

/// Both verdicts for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub model_label: String,
    pub rule_label: String,
    /// Whether the model and the rules produced the same label
    pub agrees: bool,
    pub ratios: Ratios,
    pub rules: RuleResult,
    /// Indicator columns dropped because training never saw them
    pub unseen_categories: Vec<String>,
}

impl Assessment {
    /// `(model label, rule label)`
    pub fn labels(&self) -> (&str, &str) {
        (&self.model_label, &self.rule_label)
    }
}

/// Turn a raw record into the classifier's input row.
///
/// Returns the alignment together with the unseen indicator columns.
pub fn build_features<'b>(
    input: &RawInput,
    ratios: &Ratios,
    bundle: &'b ArtifactBundle,
    policy: UnseenCategoryPolicy,
) -> Result<(Alignment<'b>, Vec<String>), EncodingError> {
    let features = engineer(input, ratios, bundle.min_values());
    let row = one_hot_encode(&features);
    let alignment = align_with_policy(&row, bundle.train_columns(), policy)?;
    let unseen = alignment
        .unseen_categories(&row)
        .map(str::to_string)
        .collect();
    Ok((alignment, unseen))
}

/// Run the classifier on an aligned row and decode its class.
pub fn predict_label<'b>(
    matrix: &FeatureMatrix<'_>,
    bundle: &'b ArtifactBundle,
) -> Result<&'b str, PipelineError> {
    let expected = bundle.train_columns().len();
    if matrix.width() != expected {
        return Err(PipelineError::ShapeMismatch {
            expected,
            actual: matrix.width(),
        });
    }

    if log::log_enabled!(log::Level::Debug) {
        let active: Vec<String> = matrix
            .iter()
            .filter(|(_, value)| *value != 0.0)
            .map(|(column, value)| format!("{}={}", column, value))
            .collect();
        debug!("Non-zero features: {}", active.join(", "));
    }

    let code = bundle.classifier().predict(matrix);
    bundle
        .label_encoder()
        .inverse_transform(code)
        .ok_or(PipelineError::UnknownClassCode {
            code,
            classes: bundle.label_encoder().len(),
        })
}

/// Score one record with both the classifier and the rule heuristic.
pub fn run(
    input: &RawInput,
    bundle: &ArtifactBundle,
    options: &PipelineOptions,
) -> Result<Assessment, PipelineError> {
    let ratios = Ratios::from_input(input);

    let (alignment, unseen_categories) =
        build_features(input, &ratios, bundle, options.unseen_categories)?;
    let model_label = predict_label(&alignment.matrix, bundle)?.to_string();

    let rules = score_rules(input, &ratios, &options.rules);
    debug!(
        "Model predicted '{}', rules scored {}/{} ('{}')",
        model_label, rules.score, rules.breakdown.max_score, rules.label
    );

    Ok(Assessment {
        agrees: model_label == rules.label,
        rule_label: rules.label.clone(),
        model_label,
        ratios,
        rules,
        unseen_categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{
        Classifier, DecisionTree, LabelEncoder, MinValues, ReferenceOptions, TreeNode,
    };
    use std::sync::{Arc, Mutex};

    fn sample_input() -> RawInput {
        RawInput {
            jenis_usaha: "Kuliner".to_string(),
            marketplace: "Shopee".to_string(),
            status_legalitas: "NIB".to_string(),
            laba: 6_000_000.0,
            biaya_karyawan: 2_000_000.0,
            omset: 30_000_000.0,
            aset: 50_000_000.0,
            tahun_berdiri: 2020,
            tenaga_kerja_perempuan: 3,
            tenaga_kerja_laki_laki: 3,
            kapasitas_produksi: 500,
            jumlah_pelanggan: 150,
        }
    }

    fn train_columns() -> Vec<String> {
        [
            "laba",
            "biaya_karyawan",
            "omset",
            "aset",
            "tahun_berdiri",
            "kapasitas_produksi",
            "profit_margin",
            "asset_turnover",
            "lama_usaha",
            "total_tenaga_kerja",
            "jenis_usaha_Fashion",
            "jenis_usaha_Kuliner",
            "marketplace_Shopee",
            "status_legalitas_NIB",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn labels() -> LabelEncoder {
        LabelEncoder::new(vec!["Sehat".to_string(), "Tidak Sehat".to_string()])
    }

    /// Healthy iff profit_margin (column 6) > 0.1
    fn margin_tree() -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split { feature: 6, threshold: 0.1, left: 1, right: 2 },
                TreeNode::Leaf { class_counts: vec![0.0, 8.0] },
                TreeNode::Leaf { class_counts: vec![9.0, 1.0] },
            ],
        }
    }

    fn bundle_with(classifier: Box<dyn Classifier>) -> ArtifactBundle {
        let mut min_values = MinValues::new();
        min_values.insert("aset".to_string(), 0.0);
        min_values.insert("omset".to_string(), 0.0);
        ArtifactBundle::new(
            classifier,
            labels(),
            train_columns(),
            min_values,
            ReferenceOptions::default(),
        )
        .unwrap()
    }

    /// Always answers with one code and remembers what it was shown.
    #[derive(Debug)]
    struct FixedClassifier {
        code: usize,
        n_classes: usize,
        seen: Arc<Mutex<Vec<Vec<f64>>>>,
    }

    impl FixedClassifier {
        fn boxed(code: usize) -> (Box<dyn Classifier>, Arc<Mutex<Vec<Vec<f64>>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let classifier = FixedClassifier {
                code,
                n_classes: 2,
                seen: Arc::clone(&seen),
            };
            (Box::new(classifier), seen)
        }
    }

    impl Classifier for FixedClassifier {
        fn kind(&self) -> &'static str {
            "fixed"
        }
        fn n_classes(&self) -> usize {
            self.n_classes
        }
        fn max_feature_index(&self) -> Option<usize> {
            None
        }
        fn predict(&self, matrix: &FeatureMatrix<'_>) -> usize {
            self.seen.lock().unwrap().push(matrix.values().to_vec());
            self.code
        }
    }

    #[test]
    fn test_run_healthy_business() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let assessment = run(&sample_input(), &bundle, &PipelineOptions::default()).unwrap();

        assert_eq!(assessment.labels(), ("Sehat", "Sehat"));
        assert!(assessment.agrees);
        assert_eq!(assessment.rules.score, 5);
        assert!(assessment.unseen_categories.is_empty());
    }

    #[test]
    fn test_zero_profit_unhealthy_regardless_of_model() {
        let mut input = sample_input();
        input.laba = 0.0;

        for code in [0, 1] {
            let (classifier, _) = FixedClassifier::boxed(code);
            let bundle = bundle_with(classifier);
            let assessment = run(&input, &bundle, &PipelineOptions::default()).unwrap();

            assert_eq!(assessment.ratios.profit_margin, 0.0);
            assert!((assessment.ratios.asset_turnover - 0.6).abs() < 1e-12);
            assert_eq!(assessment.rules.score, 0);
            assert_eq!(assessment.rule_label, "Tidak Sehat");
            assert_eq!(assessment.agrees, code == 1);
        }
    }

    #[test]
    fn test_disagreement_is_reported() {
        let (classifier, _) = FixedClassifier::boxed(1);
        let bundle = bundle_with(classifier);
        let assessment = run(&sample_input(), &bundle, &PipelineOptions::default()).unwrap();
        assert_eq!(assessment.labels(), ("Tidak Sehat", "Sehat"));
        assert!(!assessment.agrees);
    }

    #[test]
    fn test_classifier_sees_aligned_engineered_row() {
        let (classifier, seen) = FixedClassifier::boxed(0);
        let bundle = bundle_with(classifier);
        run(&sample_input(), &bundle, &PipelineOptions::default()).unwrap();

        let rows = seen.lock().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), train_columns().len());
        assert_eq!(row[0], 6_000_000.0); // laba untouched
        assert!((row[1] - 2_000_000.0_f64.ln_1p()).abs() < 1e-9); // no minimum: raw log1p
        assert!((row[2] - 30_000_001.0_f64.ln_1p()).abs() < 1e-9); // min 0: shifted by 1
        assert!((row[6] - 0.2).abs() < 1e-12); // profit_margin
        assert_eq!(row[8], 5.0); // lama_usaha
        assert_eq!(row[9], 6.0); // total_tenaga_kerja
        assert_eq!(row[10], 0.0); // jenis_usaha_Fashion
        assert_eq!(row[11], 1.0); // jenis_usaha_Kuliner
    }

    #[test]
    fn test_idempotent() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let options = PipelineOptions::default();
        let input = sample_input();

        let first = run(&input, &bundle, &options).unwrap();
        let second = run(&input, &bundle, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_not_modified() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let input = sample_input();
        let before = input.clone();
        run(&input, &bundle, &PipelineOptions::default()).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_unseen_category_dropped_by_default() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let mut input = sample_input();
        input.jenis_usaha = "Jasa".to_string();

        let assessment = run(&input, &bundle, &PipelineOptions::default()).unwrap();
        assert_eq!(assessment.unseen_categories, vec!["jenis_usaha_Jasa".to_string()]);
        assert_eq!(assessment.model_label, "Sehat");
    }

    #[test]
    fn test_unseen_category_rejected() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let mut input = sample_input();
        input.marketplace = "Lazada".to_string();
        let options = PipelineOptions {
            unseen_categories: UnseenCategoryPolicy::Reject,
            ..PipelineOptions::default()
        };

        let err = run(&input, &bundle, &options).unwrap_err();
        assert!(matches!(err, PipelineError::Encoding(EncodingError::UnseenCategories(_))));
        assert!(err.to_string().contains("marketplace_Lazada"));
    }

    #[test]
    fn test_unknown_class_code() {
        let (classifier, _) = FixedClassifier::boxed(5);
        let bundle = bundle_with(classifier);
        let err = run(&sample_input(), &bundle, &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownClassCode { code: 5, classes: 2 }));
    }

    #[test]
    fn test_shape_mismatch() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let columns = vec!["laba".to_string()];
        let matrix = FeatureMatrix::new(&columns, vec![1.0]);
        let err = predict_label(&matrix, &bundle).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 14, actual: 1 }));
    }

    #[test]
    fn test_shared_bundle_across_threads() {
        let bundle = Arc::new(bundle_with(Box::new(margin_tree())));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let bundle = Arc::clone(&bundle);
                std::thread::spawn(move || {
                    let mut input = sample_input();
                    input.laba = if i % 2 == 0 { 6_000_000.0 } else { 0.0 };
                    run(&input, &bundle, &PipelineOptions::default())
                        .unwrap()
                        .model_label
                })
            })
            .collect();

        let labels: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(labels, vec!["Sehat", "Tidak Sehat", "Sehat", "Tidak Sehat"]);
    }

    #[test]
    fn test_assessment_serializes() {
        let bundle = bundle_with(Box::new(margin_tree()));
        let assessment = run(&sample_input(), &bundle, &PipelineOptions::default()).unwrap();
        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["model_label"], "Sehat");
        assert_eq!(json["agrees"], true);
        assert_eq!(json["rules"]["score"], 5);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::classifier::{Classifier, ClassifierModel};
use super::error::ArtifactError;

pub const BUNDLE_VERSION: u32 = 1;

/// Training-time minimum per log-transformed column.
pub type MinValues = BTreeMap<String, f64>;

/// Bidirectional mapping between class names and the codes a classifier emits.
///
/// Code `i` is `classes[i]`, matching scikit-learn's `LabelEncoder.classes_`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Label for an ordinal code
    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Ordinal code for a label
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Known distinct values per categorical field, in first-seen order.
///
/// Used to enumerate choices for the user and to flag unseen values; the
/// pipeline itself never consults it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceOptions(BTreeMap<String, Vec<String>>);

impl ReferenceOptions {
    /// Build from raw lists, dropping repeated values.
    pub fn new(options: BTreeMap<String, Vec<String>>) -> Self {
        let deduped = options
            .into_iter()
            .map(|(field, values)| {
                let mut seen = HashSet::new();
                let unique: Vec<String> = values
                    .into_iter()
                    .filter(|v| seen.insert(v.clone()))
                    .collect();
                (field, unique)
            })
            .collect();
        Self(deduped)
    }

    /// Known values for a field (empty if none were recorded)
    pub fn values(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Default choice for a field: the first value seen in training
    pub fn first(&self, field: &str) -> Option<&str> {
        self.values(field).first().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// On-disk layout of an artifact bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleFile {
    pub version: u32,
    pub model: ClassifierModel,
    pub label_encoder: LabelEncoder,
    pub train_columns: Vec<String>,
    #[serde(default)]
    pub reference_options: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub min_values: MinValues,
}

/// Everything the pipeline needs from training, read-only after construction.
#[derive(Debug)]
pub struct ArtifactBundle {
    classifier: Box<dyn Classifier>,
    label_encoder: LabelEncoder,
    train_columns: Vec<String>,
    min_values: MinValues,
    reference_options: ReferenceOptions,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that its parts agree with each other.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::Invalid` if:
    /// - `train_columns` or the label classes are empty or contain duplicates
    /// - the classifier reads a feature index outside `train_columns`
    /// - the classifier was fitted on a row width other than `train_columns`
    /// - the classifier's class count differs from the label encoder's
    /// - a recorded minimum is not finite
    pub fn new(
        classifier: Box<dyn Classifier>,
        label_encoder: LabelEncoder,
        train_columns: Vec<String>,
        min_values: MinValues,
        reference_options: ReferenceOptions,
    ) -> Result<Self, ArtifactError> {
        if train_columns.is_empty() {
            return Err(ArtifactError::Invalid("train_columns is empty".to_string()));
        }
        if let Some(dup) = first_duplicate(&train_columns) {
            return Err(ArtifactError::Invalid(format!(
                "train_columns contains '{}' more than once",
                dup
            )));
        }
        if label_encoder.is_empty() {
            return Err(ArtifactError::Invalid("label_encoder has no classes".to_string()));
        }
        if let Some(dup) = first_duplicate(&label_encoder.classes) {
            return Err(ArtifactError::Invalid(format!(
                "label_encoder contains '{}' more than once",
                dup
            )));
        }
        if let Some(max) = classifier.max_feature_index() {
            if max >= train_columns.len() {
                return Err(ArtifactError::Invalid(format!(
                    "{} reads feature {} but only {} train_columns exist",
                    classifier.kind(),
                    max,
                    train_columns.len()
                )));
            }
        }
        if let Some(width) = classifier.input_width() {
            if width != train_columns.len() {
                return Err(ArtifactError::Invalid(format!(
                    "{} expects {} features but {} train_columns exist",
                    classifier.kind(),
                    width,
                    train_columns.len()
                )));
            }
        }
        if classifier.n_classes() != label_encoder.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} predicts {} classes but label_encoder has {}",
                classifier.kind(),
                classifier.n_classes(),
                label_encoder.len()
            )));
        }
        if let Some((column, _)) = min_values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ArtifactError::Invalid(format!(
                "min_values.{} is not a finite number",
                column
            )));
        }

        Ok(Self {
            classifier,
            label_encoder,
            train_columns,
            min_values,
            reference_options,
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    pub fn train_columns(&self) -> &[String] {
        &self.train_columns
    }

    pub fn min_values(&self) -> &MinValues {
        &self.min_values
    }

    /// Training minimum for a column, if one was recorded
    pub fn min_value(&self, column: &str) -> Option<f64> {
        self.min_values.get(column).copied()
    }

    pub fn reference_options(&self) -> &ReferenceOptions {
        &self.reference_options
    }
}

impl TryFrom<BundleFile> for ArtifactBundle {
    type Error = ArtifactError;

    fn try_from(file: BundleFile) -> Result<Self, Self::Error> {
        if file.version != BUNDLE_VERSION {
            return Err(ArtifactError::UnsupportedVersion(file.version));
        }
        let classifier = file.model.into_classifier().map_err(ArtifactError::Invalid)?;
        Self::new(
            classifier,
            file.label_encoder,
            file.train_columns,
            file.min_values,
            ReferenceOptions::new(file.reference_options),
        )
    }
}

fn first_duplicate(items: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .find(|item| !seen.insert(item.as_str()))
        .map(String::as_str)
}

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::engineer::EngineeredFeatures;
use super::matrix::FeatureMatrix;

/// What to do with indicator columns the classifier was never trained on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnseenCategoryPolicy {
    /// Drop the column; the category contributes no signal.
    #[default]
    DropSilently,
    /// Drop the column and log a warning.
    Warn,
    /// Fail the request.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("categories unseen during training: {}", .0.join(", "))]
    UnseenCategories(Vec<String>),
}

/// One-hot encoded row, not yet aligned to the training columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedRow {
    values: BTreeMap<String, f64>,
    indicators: BTreeSet<String>,
}

impl EncodedRow {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Whether a column is a one-hot indicator rather than a numeric field
    pub fn is_indicator(&self, column: &str) -> bool {
        self.indicators.contains(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Indicator column name for a categorical value, e.g. `marketplace_Shopee`
pub fn indicator_column(field: &str, value: &str) -> String {
    format!("{}_{}", field, value)
}

/// Keep numeric columns as-is and expand each categorical value into a
/// `{field}_{value}` indicator set to 1.
pub fn one_hot_encode(features: &EngineeredFeatures) -> EncodedRow {
    let mut row = EncodedRow::default();
    for (column, value) in features.numeric_columns() {
        row.values.insert(column.to_string(), value);
    }
    for (field, value) in features.categorical_columns() {
        let column = indicator_column(field, value);
        row.values.insert(column.clone(), 1.0);
        row.indicators.insert(column);
    }
    row
}

/// Result of reindexing an encoded row onto the training columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<'a> {
    pub matrix: FeatureMatrix<'a>,
    /// Training columns absent from the row, filled with 0
    pub filled: Vec<String>,
    /// Row columns not in the training set, dropped
    pub dropped: Vec<String>,
}

impl Alignment<'_> {
    /// Dropped columns that came from a categorical value
    pub fn unseen_categories<'r>(&'r self, row: &'r EncodedRow) -> impl Iterator<Item = &'r str> {
        self.dropped
            .iter()
            .map(String::as_str)
            .filter(|c| row.is_indicator(c))
    }
}

/// Reindex `row` to exactly `train_columns`, in that order.
pub fn align<'a>(row: &EncodedRow, train_columns: &'a [String]) -> Alignment<'a> {
    let mut filled = Vec::new();
    let values: Vec<f64> = train_columns
        .iter()
        .map(|column| {
            row.get(column).unwrap_or_else(|| {
                filled.push(column.clone());
                0.0
            })
        })
        .collect();

    let known: BTreeSet<&str> = train_columns.iter().map(String::as_str).collect();
    let dropped = row
        .columns()
        .filter(|c| !known.contains(c))
        .map(str::to_string)
        .collect();

    Alignment {
        matrix: FeatureMatrix::new(train_columns, values),
        filled,
        dropped,
    }
}

/// Align and then apply the unseen-category policy.
pub fn align_with_policy<'a>(
    row: &EncodedRow,
    train_columns: &'a [String],
    policy: UnseenCategoryPolicy,
) -> Result<Alignment<'a>, EncodingError> {
    let alignment = align(row, train_columns);
    let unseen: Vec<String> = alignment
        .unseen_categories(row)
        .map(str::to_string)
        .collect();

    if !alignment.filled.is_empty() {
        debug!("Filled {} missing training columns with 0", alignment.filled.len());
    }

    if !unseen.is_empty() {
        match policy {
            UnseenCategoryPolicy::DropSilently => {
                debug!("Dropped unseen categories: {}", unseen.join(", "));
            }
            UnseenCategoryPolicy::Warn => {
                warn!("Dropped categories unseen during training: {}", unseen.join(", "));
            }
            UnseenCategoryPolicy::Reject => return Err(EncodingError::UnseenCategories(unseen)),
        }
    }

    Ok(alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::MinValues;
    use crate::features::engineer::engineer;
    use crate::features::ratios::Ratios;
    use crate::features::tests::sample_input;

    fn encoded(jenis: &str, marketplace: &str) -> EncodedRow {
        let mut input = sample_input();
        input.jenis_usaha = jenis.to_string();
        input.marketplace = marketplace.to_string();
        let ratios = Ratios::from_input(&input);
        one_hot_encode(&engineer(&input, &ratios, &MinValues::new()))
    }

    fn train_columns() -> Vec<String> {
        [
            "laba",
            "omset",
            "lama_usaha",
            "jenis_usaha_Fashion",
            "jenis_usaha_Kuliner",
            "marketplace_Shopee",
            "marketplace_Tokopedia",
            "status_legalitas_NIB",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_one_hot_columns() {
        let row = encoded("Kuliner", "Shopee");
        assert_eq!(row.get("jenis_usaha_Kuliner"), Some(1.0));
        assert_eq!(row.get("marketplace_Shopee"), Some(1.0));
        assert_eq!(row.get("status_legalitas_NIB"), Some(1.0));
        assert_eq!(row.get("jenis_usaha_Fashion"), None);
        assert!(row.is_indicator("marketplace_Shopee"));
        assert!(!row.is_indicator("laba"));
        // 13 numeric + 3 indicators
        assert_eq!(row.len(), 16);
    }

    #[test]
    fn test_alignment_matches_train_columns_exactly() {
        let columns = train_columns();
        for (jenis, marketplace) in [("Kuliner", "Shopee"), ("Fashion", "Tokopedia"), ("Jasa", "Offline")] {
            let row = encoded(jenis, marketplace);
            let alignment = align(&row, &columns);
            assert_eq!(alignment.matrix.columns(), columns.as_slice());
            assert_eq!(alignment.matrix.width(), columns.len());
        }
    }

    #[test]
    fn test_alignment_fills_and_drops() {
        let columns = train_columns();
        let row = encoded("Fashion", "Shopee");
        let alignment = align(&row, &columns);

        assert_eq!(alignment.matrix.get("jenis_usaha_Fashion"), Some(1.0));
        assert_eq!(alignment.matrix.get("jenis_usaha_Kuliner"), Some(0.0));
        assert_eq!(alignment.matrix.get("marketplace_Tokopedia"), Some(0.0));
        assert_eq!(alignment.matrix.get("lama_usaha"), Some(5.0));
        assert!(alignment.filled.contains(&"jenis_usaha_Kuliner".to_string()));
        // Numeric columns outside the training set are dropped too
        assert!(alignment.dropped.contains(&"jumlah_pelanggan".to_string()));
        assert_eq!(alignment.unseen_categories(&row).count(), 0);
    }

    #[test]
    fn test_unseen_category_dropped_silently_by_default() {
        let columns = train_columns();
        let row = encoded("Jasa", "Shopee");
        let alignment = align_with_policy(&row, &columns, UnseenCategoryPolicy::default()).unwrap();

        let unseen: Vec<&str> = alignment.unseen_categories(&row).collect();
        assert_eq!(unseen, vec!["jenis_usaha_Jasa"]);
        // Behaves like "no category": every jenis_usaha indicator is 0
        assert_eq!(alignment.matrix.get("jenis_usaha_Fashion"), Some(0.0));
        assert_eq!(alignment.matrix.get("jenis_usaha_Kuliner"), Some(0.0));
    }

    #[test]
    fn test_unseen_category_warn_still_aligns() {
        let columns = train_columns();
        let row = encoded("Jasa", "Shopee");
        let alignment = align_with_policy(&row, &columns, UnseenCategoryPolicy::Warn).unwrap();
        assert_eq!(alignment.matrix.width(), columns.len());
    }

    #[test]
    fn test_unseen_category_rejected() {
        let columns = train_columns();
        let row = encoded("Jasa", "Lazada");
        let err = align_with_policy(&row, &columns, UnseenCategoryPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            EncodingError::UnseenCategories(vec![
                "jenis_usaha_Jasa".to_string(),
                "marketplace_Lazada".to_string(),
            ])
        );
    }

    #[test]
    fn test_reject_ignores_dropped_numeric_columns() {
        let columns = train_columns();
        let row = encoded("Kuliner", "Shopee");
        assert!(align_with_policy(&row, &columns, UnseenCategoryPolicy::Reject).is_ok());
    }

    #[test]
    fn test_policy_parse() {
        let policy: UnseenCategoryPolicy = serde_saphyr::from_str("reject").unwrap();
        assert_eq!(policy, UnseenCategoryPolicy::Reject);
        let policy: UnseenCategoryPolicy = serde_saphyr::from_str("drop_silently").unwrap();
        assert_eq!(policy, UnseenCategoryPolicy::DropSilently);
    }
}

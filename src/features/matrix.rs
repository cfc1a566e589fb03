/// A single row of model input, aligned to the artifact's training columns.
///
/// Only produced by column alignment, so `values` always has one entry per
/// training column, in training order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix<'a> {
    columns: &'a [String],
    values: Vec<f64>,
}

impl<'a> FeatureMatrix<'a> {
    pub(crate) fn new(columns: &'a [String], values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Value of a named column, if it is one of the training columns
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// Iterate `(column, value)` pairs in training order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

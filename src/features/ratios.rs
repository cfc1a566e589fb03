use serde::Serialize;

use crate::input::RawInput;

/// Financial ratios shared by feature engineering and the rule score.
///
/// Computed once per request so both consumers see bit-identical values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratios {
    /// laba / omset, or 0 when there is no revenue
    pub profit_margin: f64,
    /// omset / aset, or 0 when there are no assets
    pub asset_turnover: f64,
}

impl Ratios {
    pub fn from_input(input: &RawInput) -> Self {
        let profit_margin = if input.omset > 0.0 {
            input.laba / input.omset
        } else {
            0.0
        };
        let asset_turnover = if input.aset > 0.0 {
            input.omset / input.aset
        } else {
            0.0
        };
        Self {
            profit_margin,
            asset_turnover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::sample_input;

    #[test]
    fn test_ratios() {
        let mut input = sample_input();
        input.laba = 6_000_000.0;
        let ratios = Ratios::from_input(&input);
        assert!((ratios.profit_margin - 0.2).abs() < 1e-12);
        assert!((ratios.asset_turnover - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_zero_revenue_guard() {
        let mut input = sample_input();
        input.omset = 0.0;
        let ratios = Ratios::from_input(&input);
        assert_eq!(ratios.profit_margin, 0.0);
        // omset / aset with omset = 0 is a plain zero, not a guard
        assert_eq!(ratios.asset_turnover, 0.0);
    }

    #[test]
    fn test_zero_assets_guard() {
        let mut input = sample_input();
        input.aset = 0.0;
        let ratios = Ratios::from_input(&input);
        assert_eq!(ratios.asset_turnover, 0.0);
        assert!(ratios.profit_margin.is_finite());
    }

    #[test]
    fn test_negative_profit_margin() {
        let mut input = sample_input();
        input.laba = -3_000_000.0;
        let ratios = Ratios::from_input(&input);
        assert!((ratios.profit_margin + 0.1).abs() < 1e-12);
    }
}

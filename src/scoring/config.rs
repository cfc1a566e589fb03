use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFITABLE_POINTS: u32 = 2;
pub const DEFAULT_COVERS_PAYROLL_POINTS: u32 = 2;
pub const DEFAULT_MARGIN_THRESHOLD: f64 = 0.10;
pub const DEFAULT_MARGIN_POINTS: u32 = 1;
pub const DEFAULT_TURNOVER_THRESHOLD: f64 = 1.0;
pub const DEFAULT_TURNOVER_POINTS: u32 = 1;
pub const DEFAULT_HEALTHY_THRESHOLD: u32 = 4;
pub const DEFAULT_HEALTHY_LABEL: &str = "Sehat";
pub const DEFAULT_UNHEALTHY_LABEL: &str = "Tidak Sehat";

/// Rule-based health score configuration.
///
/// Every field is optional; missing fields fall back to the reference
/// heuristic (2 + 2 + 1 + 1 points, healthy at 4 or more).
///
/// Example YAML:
/// ```yaml
/// rules:
///   margin_threshold: 0.15
///   turnover_threshold: 1.2
///   healthy_threshold: 5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Points when laba (profit) is positive (default: 2)
    #[serde(default)]
    pub profitable_points: Option<u32>,

    /// Points when laba exceeds biaya_karyawan (default: 2)
    #[serde(default)]
    pub covers_payroll_points: Option<u32>,

    /// Profit margin must be strictly above this (default: 0.10)
    #[serde(default)]
    pub margin_threshold: Option<f64>,

    /// Points for a healthy margin (default: 1)
    #[serde(default)]
    pub margin_points: Option<u32>,

    /// Asset turnover must be strictly above this (default: 1.0)
    #[serde(default)]
    pub turnover_threshold: Option<f64>,

    /// Points for a healthy turnover (default: 1)
    #[serde(default)]
    pub turnover_points: Option<u32>,

    /// Minimum total for the healthy label (default: 4)
    #[serde(default)]
    pub healthy_threshold: Option<u32>,

    /// Label for a passing score; should match a model class (default: "Sehat")
    #[serde(default)]
    pub healthy_label: Option<String>,

    /// Label for a failing score (default: "Tidak Sehat")
    #[serde(default)]
    pub unhealthy_label: Option<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            profitable_points: Some(DEFAULT_PROFITABLE_POINTS),
            covers_payroll_points: Some(DEFAULT_COVERS_PAYROLL_POINTS),
            margin_threshold: Some(DEFAULT_MARGIN_THRESHOLD),
            margin_points: Some(DEFAULT_MARGIN_POINTS),
            turnover_threshold: Some(DEFAULT_TURNOVER_THRESHOLD),
            turnover_points: Some(DEFAULT_TURNOVER_POINTS),
            healthy_threshold: Some(DEFAULT_HEALTHY_THRESHOLD),
            healthy_label: Some(DEFAULT_HEALTHY_LABEL.to_string()),
            unhealthy_label: Some(DEFAULT_UNHEALTHY_LABEL.to_string()),
        }
    }
}

impl RuleConfig {
    /// Most points the rules can award
    ///
    /// Saturates at `u32::MAX` rather than wrapping on absurd point values.
    pub fn max_score(&self) -> u32 {
        [
            self.profitable_points.unwrap_or(DEFAULT_PROFITABLE_POINTS),
            self.covers_payroll_points.unwrap_or(DEFAULT_COVERS_PAYROLL_POINTS),
            self.margin_points.unwrap_or(DEFAULT_MARGIN_POINTS),
            self.turnover_points.unwrap_or(DEFAULT_TURNOVER_POINTS),
        ]
        .into_iter()
        .fold(0u32, u32::saturating_add)
    }

    pub fn healthy_label(&self) -> &str {
        self.healthy_label.as_deref().unwrap_or(DEFAULT_HEALTHY_LABEL)
    }

    pub fn unhealthy_label(&self) -> &str {
        self.unhealthy_label.as_deref().unwrap_or(DEFAULT_UNHEALTHY_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_config() {
        let config = RuleConfig::default();

        assert_eq!(config.profitable_points, Some(2));
        assert_eq!(config.covers_payroll_points, Some(2));
        assert_eq!(config.margin_threshold, Some(0.10));
        assert_eq!(config.turnover_threshold, Some(1.0));
        assert_eq!(config.healthy_threshold, Some(4));
        assert_eq!(config.max_score(), 6);
        assert_eq!(config.healthy_label(), "Sehat");
        assert_eq!(config.unhealthy_label(), "Tidak Sehat");
    }

    #[test]
    fn test_rule_config_serde_roundtrip() {
        let config = RuleConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: RuleConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_rule_config_parse() {
        let yaml = r#"
margin_threshold: 0.15
healthy_threshold: 5
"#;
        let config: RuleConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.margin_threshold, Some(0.15));
        assert_eq!(config.healthy_threshold, Some(5));
        assert!(config.profitable_points.is_none());
        // Unset fields still count toward the maximum with their defaults
        assert_eq!(config.max_score(), 6);
        assert_eq!(config.healthy_label(), "Sehat");
    }

    #[test]
    fn test_empty_rule_config_parse() {
        let config: RuleConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.margin_threshold.is_none());
        assert!(config.healthy_label.is_none());
    }

    #[test]
    fn test_max_score_saturates() {
        let yaml = "profitable_points: 4294967295\ncovers_payroll_points: 1\n";
        let config: RuleConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.max_score(), u32::MAX);
    }

    #[test]
    fn test_unknown_rule_field_rejected() {
        let yaml = "bonus_points: 3\n";
        assert!(serde_saphyr::from_str::<RuleConfig>(yaml).is_err());
    }
}

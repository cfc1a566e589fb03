use serde::Serialize;

use super::config::*;
use crate::features::Ratios;
use crate::input::RawInput;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleContribution {
    pub label: String,       // e.g. "Profitable", "Margin"
    pub description: String, // e.g. "profit margin 0.200 > 0.10"
    pub passed: bool,
    pub points: u32, // Points awarded (0 when the rule did not pass)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBreakdown {
    pub max_score: u32,
    pub healthy_threshold: u32,
    pub rules: Vec<RuleContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub score: u32,
    pub healthy: bool,
    pub label: String,
    pub breakdown: RuleBreakdown,
}

/// Score raw input against the rule heuristic.
///
/// Reads only the raw fields and the shared `ratios`; never the engineered
/// features or the classifier.
pub fn score_rules(input: &RawInput, ratios: &Ratios, config: &RuleConfig) -> RuleResult {
    let margin_threshold = config.margin_threshold.unwrap_or(DEFAULT_MARGIN_THRESHOLD);
    let turnover_threshold = config.turnover_threshold.unwrap_or(DEFAULT_TURNOVER_THRESHOLD);
    let healthy_threshold = config.healthy_threshold.unwrap_or(DEFAULT_HEALTHY_THRESHOLD);

    let checks = [
        (
            "Profitable",
            input.laba > 0.0,
            config.profitable_points.unwrap_or(DEFAULT_PROFITABLE_POINTS),
            format!("laba {} > 0", input.laba),
        ),
        (
            "Covers Payroll",
            input.laba > input.biaya_karyawan,
            config.covers_payroll_points.unwrap_or(DEFAULT_COVERS_PAYROLL_POINTS),
            format!("laba {} > biaya_karyawan {}", input.laba, input.biaya_karyawan),
        ),
        (
            "Margin",
            ratios.profit_margin > margin_threshold,
            config.margin_points.unwrap_or(DEFAULT_MARGIN_POINTS),
            format!("profit margin {:.3} > {}", ratios.profit_margin, margin_threshold),
        ),
        (
            "Asset Turnover",
            ratios.asset_turnover > turnover_threshold,
            config.turnover_points.unwrap_or(DEFAULT_TURNOVER_POINTS),
            format!("asset turnover {:.3} > {}", ratios.asset_turnover, turnover_threshold),
        ),
    ];

    let mut score: u32 = 0;
    let mut rules = Vec::with_capacity(checks.len());
    for (label, passed, points, description) in checks {
        let awarded = if passed { points } else { 0 };
        score = score.saturating_add(awarded);
        rules.push(RuleContribution {
            label: label.to_string(),
            description,
            passed,
            points: awarded,
        });
    }

    let healthy = score >= healthy_threshold;
    let label = if healthy {
        config.healthy_label()
    } else {
        config.unhealthy_label()
    };

    RuleResult {
        score,
        healthy,
        label: label.to_string(),
        breakdown: RuleBreakdown {
            max_score: config.max_score(),
            healthy_threshold,
            rules,
        },
    }
}

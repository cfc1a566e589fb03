use super::config::{RuleConfig, DEFAULT_HEALTHY_THRESHOLD};

/// Validate rule configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_rules(config: &RuleConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(threshold) = config.margin_threshold {
        if !threshold.is_finite() {
            errors.push("rules.margin_threshold: must be a finite number".to_string());
        }
    }

    if let Some(threshold) = config.turnover_threshold {
        if !threshold.is_finite() {
            errors.push("rules.turnover_threshold: must be a finite number".to_string());
        } else if threshold < 0.0 {
            errors.push("rules.turnover_threshold: must be non-negative".to_string());
        }
    }

    let healthy_threshold = config.healthy_threshold.unwrap_or(DEFAULT_HEALTHY_THRESHOLD);
    let max_score = config.max_score();
    if healthy_threshold > max_score {
        errors.push(format!(
            "rules.healthy_threshold: {} can never be reached (rules award at most {})",
            healthy_threshold, max_score
        ));
    }

    if config.healthy_label().trim().is_empty() {
        errors.push("rules.healthy_label: must not be empty".to_string());
    }
    if config.unhealthy_label().trim().is_empty() {
        errors.push("rules.unhealthy_label: must not be empty".to_string());
    }
    if config.healthy_label() == config.unhealthy_label() {
        errors.push(format!(
            "rules: healthy_label and unhealthy_label are both '{}'",
            config.healthy_label()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

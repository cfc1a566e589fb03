use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::artifact::{ArtifactBundle, ReferenceOptions};
use crate::features::LOG_TRANSFORM_COLUMNS;
use crate::input::CategoricalField;
use crate::pipeline::Assessment;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a ratio with three decimals ("0.200")
pub fn format_ratio(value: f64) -> String {
    format!("{:.3}", value)
}

/// Format both verdicts and their agreement.
///
/// With `verbose`, the per-rule breakdown and the ratios are appended.
pub fn format_assessment(assessment: &Assessment, verbose: bool, use_colors: bool) -> String {
    let rules = &assessment.rules;
    let score = format!("{}/{}", rules.score, rules.breakdown.max_score);
    let agreement = if assessment.agrees {
        "Model prediction MATCHES the business rules."
    } else {
        "Model prediction DIFFERS from the business rules."
    };

    let mut lines = Vec::new();
    if use_colors {
        let model = if assessment.agrees {
            assessment.model_label.green().bold().to_string()
        } else {
            assessment.model_label.yellow().bold().to_string()
        };
        lines.push(format!("Model prediction: {}", model));
        lines.push(format!(
            "Business rules:   {} (score {})",
            assessment.rule_label.bold(),
            score
        ));
        if assessment.agrees {
            lines.push(agreement.cyan().to_string());
        } else {
            lines.push(agreement.red().to_string());
        }
    } else {
        lines.push(format!("Model prediction: {}", assessment.model_label));
        lines.push(format!(
            "Business rules:   {} (score {})",
            assessment.rule_label, score
        ));
        lines.push(agreement.to_string());
    }

    if !assessment.unseen_categories.is_empty() {
        lines.push(format!(
            "Note: unseen during training, ignored by the model: {}",
            assessment.unseen_categories.join(", ")
        ));
    }

    if verbose {
        lines.push(String::new());
        lines.push(format!(
            "  Profit margin:  {}",
            format_ratio(assessment.ratios.profit_margin)
        ));
        lines.push(format!(
            "  Asset turnover: {}",
            format_ratio(assessment.ratios.asset_turnover)
        ));
        lines.push(format!(
            "  Rules (healthy at >= {}):",
            rules.breakdown.healthy_threshold
        ));
        for rule in &rules.breakdown.rules {
            let mark = if rule.passed { "+" } else { " " };
            let line = format!(
                "    {} {:<15} {:>2}  {}",
                mark, rule.label, rule.points, rule.description
            );
            if use_colors && !rule.passed {
                lines.push(line.dimmed().to_string());
            } else {
                lines.push(line);
            }
        }
    }

    lines.join("\n")
}

/// Format as tab-separated values for scripting
/// Columns: model_label, rule_label, agrees, score (no headers, no colors)
pub fn format_tsv(assessment: &Assessment) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        assessment.model_label, assessment.rule_label, assessment.agrees, assessment.rules.score
    )
}

/// Pretty JSON for machine consumers
pub fn format_json(assessment: &Assessment) -> serde_json::Result<String> {
    serde_json::to_string_pretty(assessment)
}

/// List the known choices for every categorical field
pub fn format_options(options: &ReferenceOptions, use_colors: bool) -> String {
    CategoricalField::ALL
        .iter()
        .map(|field| {
            let values = options.values(field.name());
            let header = format!("{} ({})", field.caption(), field.name());
            let header = if use_colors {
                header.bold().to_string()
            } else {
                header
            };
            if values.is_empty() {
                format!("{}\n  (no options recorded)", header)
            } else {
                let body: Vec<String> = values.iter().map(|v| format!("  {}", v)).collect();
                format!("{}\n{}", header, body.join("\n"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Summarize a loaded bundle
pub fn format_bundle_summary(bundle: &ArtifactBundle) -> String {
    let classifier = bundle.classifier();
    let mut lines = vec![
        format!("Model:          {}", classifier.kind()),
        format!("Classes:        {}", bundle.label_encoder().classes.join(", ")),
        format!("Train columns:  {}", bundle.train_columns().len()),
        "Log shift minimums:".to_string(),
    ];
    for column in LOG_TRANSFORM_COLUMNS {
        match bundle.min_value(column) {
            Some(min) => lines.push(format!("  {:<20} {}", column, min)),
            None => lines.push(format!("  {:<20} (none, raw log1p)", column)),
        }
    }
    lines.join("\n")
}

use super::types::{CategoricalField, RawInput};
use crate::artifact::ReferenceOptions;

pub const MIN_FOUNDING_YEAR: i32 = 1980;
pub const MAX_FOUNDING_YEAR: i32 = 2025;

/// Validate a collected record before it is handed to the pipeline.
/// Returns all validation errors at once (not just the first).
pub fn validate_input(input: &RawInput) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !input.laba.is_finite() {
        errors.push("laba: must be a finite number".to_string());
    }

    let non_negative = [
        ("biaya_karyawan", input.biaya_karyawan),
        ("omset", input.omset),
        ("aset", input.aset),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() {
            errors.push(format!("{}: must be a finite number", name));
        } else if value < 0.0 {
            errors.push(format!("{}: must be non-negative, got {}", name, value));
        }
    }

    if !(MIN_FOUNDING_YEAR..=MAX_FOUNDING_YEAR).contains(&input.tahun_berdiri) {
        errors.push(format!(
            "tahun_berdiri: must be between {} and {}, got {}",
            MIN_FOUNDING_YEAR, MAX_FOUNDING_YEAR, input.tahun_berdiri
        ));
    }

    for field in CategoricalField::ALL {
        if input.categorical(field).trim().is_empty() {
            errors.push(format!("{}: must not be empty", field.name()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// List categorical values that the artifact has never seen.
///
/// These are warnings, not errors: how the pipeline treats them is decided
/// by its unseen-category policy.
pub fn unknown_categories(input: &RawInput, options: &ReferenceOptions) -> Vec<String> {
    CategoricalField::ALL
        .iter()
        .filter_map(|&field| {
            let value = input.categorical(field);
            let known = options.values(field.name());
            if known.is_empty() || known.iter().any(|v| v == value) {
                None
            } else {
                Some(format!(
                    "{}: '{}' is not a known option ({})",
                    field.name(),
                    value,
                    known.join(", ")
                ))
            }
        })
        .collect()
}

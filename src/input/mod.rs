pub mod types;
pub mod validation;

pub use types::{CategoricalField, RawInput};
pub use validation::{
    unknown_categories, validate_input, MAX_FOUNDING_YEAR, MIN_FOUNDING_YEAR,
};

pub mod formatter;

pub use formatter::{
    format_assessment, format_bundle_summary, format_json, format_options, format_ratio,
    format_tsv, should_use_colors,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::features::UnseenCategoryPolicy;
use crate::pipeline::PipelineOptions;
use crate::scoring::RuleConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Artifact bundle location (defaults to ~/.config/umkm-health/umkm_predict.json)
    #[serde(default)]
    pub artifact_path: Option<PathBuf>,

    /// drop_silently | warn | reject
    #[serde(default)]
    pub unseen_categories: Option<UnseenCategoryPolicy>,

    #[serde(default)]
    pub rules: Option<RuleConfig>,
}

impl Config {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            unseen_categories: self.unseen_categories.unwrap_or_default(),
            rules: self.rules.clone().unwrap_or_default(),
        }
    }
}

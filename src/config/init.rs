use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::schema::Config;
use crate::artifact::get_artifact_path;
use crate::features::UnseenCategoryPolicy;
use crate::scoring::RuleConfig;

const HEADER: &str = "\
# umkm-health configuration
#
# artifact_path      trained bundle (JSON) loaded once at startup
# unseen_categories  drop_silently | warn | reject
# rules              rule-based baseline; remove a key to use its default
";

/// Render the default configuration as commented YAML.
pub fn default_config_yaml() -> Result<String> {
    let config = Config {
        artifact_path: Some(get_artifact_path()),
        unseen_categories: Some(UnseenCategoryPolicy::default()),
        rules: Some(RuleConfig::default()),
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    Ok(format!("{}\n{}", HEADER, yaml))
}

/// Write the default configuration to `path` (or the default config path).
///
/// Refuses to replace an existing file unless `force` is set. The file is
/// written atomically, so an interrupted write never leaves a partial config.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(super::get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let yaml = default_config_yaml()?;
    write_atomically(&config_path, &yaml)?;

    Ok(config_path)
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    // Create parent directories
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

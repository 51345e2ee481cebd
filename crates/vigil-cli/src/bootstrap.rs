use std::path::{Path, PathBuf};

use anyhow::Context;
use vigil_config::VigilConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then layered config, then apply command-line path overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<VigilConfig> {
    load_dotenv(flags.config.as_deref())?;
    VigilConfig::warn_misspelled_env();

    let mut config = VigilConfig::load_from(flags.config.as_deref())
        .context("failed to load vigil configuration")?;
    apply_overrides(&mut config, flags);
    Ok(config)
}

fn apply_overrides(config: &mut VigilConfig, flags: &GlobalFlags) {
    if let Some(root) = &flags.root {
        config.checks.root.clone_from(root);
    }
    if let Some(data) = &flags.data {
        config.data.snapshot.clone_from(data);
    }
}

/// `.env` next to an explicit config file wins over one in the working directory.
fn load_dotenv(explicit: Option<&Path>) -> anyhow::Result<()> {
    let candidates: Vec<PathBuf> = explicit
        .and_then(Path::parent)
        .map(|dir| dir.join(".env"))
        .into_iter()
        .chain(std::iter::once(PathBuf::from(".env")))
        .collect();

    for env_path in candidates {
        if env_path.is_file() {
            dotenvy::from_path(&env_path)
                .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
            tracing::debug!(path = %env_path.display(), "loaded dotenv file");
            return Ok(());
        }
    }
    Ok(())
}

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use vigil_config::VigilConfig;
use vigil_core::data::{DataSource, MemorySource};
use vigil_engine::{Engine, UnitLoader};
use vigil_registry::Registry;
use vigil_runner::JobRunner;
use vigil_store::ResultStore;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: VigilConfig,
    pub store: Arc<dyn ResultStore>,
}

impl AppContext {
    pub fn init(config: VigilConfig) -> anyhow::Result<Self> {
        let store = vigil_store::open_store(&config.store).context("failed to open result store")?;
        Ok(Self { config, store })
    }

    pub fn checks_root(&self) -> &Path {
        &self.config.checks.root
    }

    /// Read the data snapshot. A missing file yields an empty source.
    pub fn load_data(&self) -> anyhow::Result<Arc<dyn DataSource>> {
        let path = &self.config.data.snapshot;
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "data snapshot not found; checks will see no objects"
            );
            return Ok(Arc::new(MemorySource::empty()));
        }
        let source = MemorySource::from_path(path)
            .with_context(|| format!("failed to read data snapshot {}", path.display()))?;
        Ok(Arc::new(source))
    }

    /// Engine with every native unit this binary ships.
    pub fn engine(&self) -> Engine {
        Engine::new(UnitLoader::new(), self.config.runner.default_timeout())
    }

    pub fn runner(&self, registry: Arc<Registry>) -> anyhow::Result<JobRunner> {
        Ok(JobRunner::new(
            self.engine(),
            registry,
            self.load_data()?,
            Arc::clone(&self.store),
            &self.config.runner,
        ))
    }
}

// Cache runtime collaborator: snapshot query plus reset/invalidate commands

mod command;
mod fixture;

pub use command::CommandRuntime;
pub use fixture::FixtureRuntime;

use crate::config::{RuntimeConfig, RuntimeKind};
use crate::models::RawSnapshot;
use crate::normalizer::normalize_path;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("unexpected command output: {0:?}")]
    UnexpectedOutput(String),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("runtime state lock poisoned")]
    Poisoned,
}

/// Narrow query/command API of the runtime that owns the cache.
///
/// Implementations are blocking; `RuntimeRepo` moves calls onto the blocking pool.
pub trait CacheRuntime: Send + Sync {
    fn snapshot(&self) -> Result<RawSnapshot, RuntimeError>;

    fn reset_all(&self) -> Result<bool, RuntimeError>;

    fn invalidate(&self, path: &str) -> Result<bool, RuntimeError>;

    /// One top-level section of the raw snapshot.
    fn section(&self, name: &str) -> Result<Option<serde_json::Value>, RuntimeError> {
        Ok(self.snapshot()?.section(name))
    }

    /// Invalidate every cached script whose normalized path contains `needle`
    /// (case-insensitive). True iff every match was invalidated; no match counts as success.
    fn invalidate_matching(&self, needle: &str) -> Result<bool, RuntimeError> {
        let needle = needle.to_lowercase();
        let snapshot = self.snapshot()?;
        let mut found = 0usize;
        let mut succeeded = 0usize;
        for script in snapshot
            .scripts
            .iter()
            .filter(|s| normalize_path(&s.full_path).to_lowercase().contains(&needle))
        {
            found += 1;
            if self.invalidate(&script.full_path)? {
                succeeded += 1;
            }
        }
        tracing::debug!(
            operation = "invalidate_matching",
            found,
            succeeded,
            "substring invalidation finished"
        );
        Ok(found == succeeded)
    }
}

/// Build the configured collaborator adapter.
pub fn from_config(config: &RuntimeConfig) -> anyhow::Result<Arc<dyn CacheRuntime>> {
    match config.kind {
        RuntimeKind::Command => {
            let program = config
                .program
                .clone()
                .ok_or_else(|| anyhow::anyhow!("runtime.program is not set"))?;
            Ok(Arc::new(CommandRuntime::new(program, config.args.clone())))
        }
        RuntimeKind::Fixture => {
            let path = config
                .fixture_path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("runtime.fixture_path is not set"))?;
            Ok(Arc::new(FixtureRuntime::from_path(path)?))
        }
    }
}

/// Async facade over a `CacheRuntime`; every call runs on the blocking pool.
#[derive(Clone)]
pub struct RuntimeRepo {
    runtime: Arc<dyn CacheRuntime>,
}

impl RuntimeRepo {
    pub fn new(runtime: Arc<dyn CacheRuntime>) -> Self {
        Self { runtime }
    }

    async fn blocking<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CacheRuntime) -> Result<T, RuntimeError> + Send + 'static,
    {
        let runtime = self.runtime.clone();
        let result = tokio::task::spawn_blocking(move || f(runtime.as_ref()))
            .await
            .map_err(|e| anyhow::anyhow!("runtime task join: {}", e))?;
        Ok(result?)
    }

    #[instrument(skip(self), fields(repo = "runtime", operation = "snapshot"))]
    pub async fn snapshot(&self) -> anyhow::Result<RawSnapshot> {
        self.blocking(|rt| rt.snapshot()).await
    }

    #[instrument(skip(self), fields(repo = "runtime", operation = "section"))]
    pub async fn section(&self, name: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let name = name.to_string();
        self.blocking(move |rt| rt.section(&name)).await
    }

    #[instrument(skip(self), fields(repo = "runtime", operation = "reset_all"))]
    pub async fn reset_all(&self) -> anyhow::Result<bool> {
        self.blocking(|rt| rt.reset_all()).await
    }

    #[instrument(skip(self), fields(repo = "runtime", operation = "invalidate"))]
    pub async fn invalidate(&self, path: &str) -> anyhow::Result<bool> {
        let path = path.to_string();
        self.blocking(move |rt| rt.invalidate(&path)).await
    }

    #[instrument(skip(self), fields(repo = "runtime", operation = "invalidate_matching"))]
    pub async fn invalidate_matching(&self, needle: &str) -> anyhow::Result<bool> {
        let needle = needle.to_string();
        self.blocking(move |rt| rt.invalidate_matching(&needle)).await
    }
}

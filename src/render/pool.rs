//! Bounded-concurrency converter pool.

use super::Renderer;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs conversions on blocking threads, at most `jobs` at a time.
///
/// Clones share the same semaphore.
#[derive(Clone)]
pub struct RenderPool {
    renderer: Arc<dyn Renderer>,
    permits: Arc<Semaphore>,
    jobs: usize,
}

impl RenderPool {
    pub fn new(renderer: Arc<dyn Renderer>, jobs: usize) -> Self {
        let jobs = jobs.max(1);
        Self {
            renderer,
            permits: Arc::new(Semaphore::new(jobs)),
            jobs,
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    /// Convert one file.
    pub async fn render(&self, path: &Path) -> Result<String, ConvertError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ConvertError::PoolClosed)?;

        let renderer = Arc::clone(&self.renderer);
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            // Released when the closure returns or unwinds.
            let _permit = permit;
            renderer.render(&owned)
        })
        .await
        .map_err(|_| ConvertError::Join {
            path: path.to_path_buf(),
        })?
    }

    /// Convert every file, preserving input order.
    ///
    /// Waits for all conversions; on failure returns the error of the
    /// earliest failing input.
    pub async fn render_all(&self, paths: &[PathBuf]) -> Result<Vec<String>, ConvertError> {
        let mut set = JoinSet::new();
        for (index, path) in paths.iter().enumerate() {
            let pool = self.clone();
            let path = path.clone();
            set.spawn(async move { (index, pool.render(&path).await) });
        }

        let mut outputs: Vec<Option<String>> = vec![None; paths.len()];
        let mut first_error: Option<(usize, ConvertError)> = None;

        while let Some(joined) = set.join_next().await {
            let (index, result) = match joined {
                Ok(pair) => pair,
                Err(_) => (usize::MAX, Err(ConvertError::PoolClosed)),
            };
            match result {
                Ok(html) => outputs[index] = Some(html),
                Err(err) => {
                    if first_error.as_ref().is_none_or(|(i, _)| index < *i) {
                        first_error = Some((index, err));
                    }
                }
            }
        }

        if let Some((_, err)) = first_error {
            return Err(err);
        }
        Ok(outputs.into_iter().flatten().collect())
    }
}

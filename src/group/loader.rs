//! Source-of-truth loaders
//!
//! A group calls its loader when no cached copy of a key is reachable.

use async_trait::async_trait;

/// Computes a value from scratch.
///
/// Loaders that block (disk, database drivers without async support) should
/// move the work off the runtime, e.g. with `tokio::task::spawn_blocking`.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a synchronous closure into a [`Loader`].
pub struct LoaderFn<F>(pub F);

/// Wraps `f` as a loader.
pub fn loader_fn<F>(f: F) -> LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    LoaderFn(f)
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

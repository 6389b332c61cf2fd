//! Time-bounded caching of the PATH directory and extension lists

use super::ttl::TtlCache;
use crate::environment::PathSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DIRECTORIES_KEY: &str = "path.directories";
pub const EXTENSIONS_KEY: &str = "path.extensions";

/// Default lifetime of the cached PATH directories
pub const DEFAULT_DIRECTORIES_TTL: Duration = Duration::from_secs(5 * 60);

/// Default lifetime of the cached extension list
pub const DEFAULT_EXTENSIONS_TTL: Duration = Duration::from_secs(10 * 60);

/// Independent lifetimes of the two cached lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLifetimes {
    pub directories: Duration,
    pub extensions: Duration,
}

impl Default for CacheLifetimes {
    fn default() -> Self {
        Self {
            directories: DEFAULT_DIRECTORIES_TTL,
            extensions: DEFAULT_EXTENSIONS_TTL,
        }
    }
}

/// A `PathSource` that answers from a shared `TtlCache`
///
/// On a miss the wrapped source is read synchronously and the result
/// stored before it is returned. An unset PATH is cached as well.
#[derive(Clone)]
pub struct CachedPathSource {
    inner: Arc<dyn PathSource>,
    cache: Arc<TtlCache>,
    lifetimes: CacheLifetimes,
}

impl CachedPathSource {
    pub fn new(inner: Arc<dyn PathSource>, cache: Arc<TtlCache>) -> Self {
        Self::with_lifetimes(inner, cache, CacheLifetimes::default())
    }

    pub fn with_lifetimes(
        inner: Arc<dyn PathSource>,
        cache: Arc<TtlCache>,
        lifetimes: CacheLifetimes,
    ) -> Self {
        Self {
            inner,
            cache,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> CacheLifetimes {
        self.lifetimes
    }
}

impl PathSource for CachedPathSource {
    fn directories(&self) -> Option<Vec<PathBuf>> {
        self.cache.get_or_insert_with(
            DIRECTORIES_KEY,
            self.lifetimes.directories,
            || self.inner.directories(),
        )
    }

    fn extensions(&self) -> Vec<String> {
        self.cache
            .get_or_insert_with(EXTENSIONS_KEY, self.lifetimes.extensions, || {
                self.inner.extensions()
            })
    }
}

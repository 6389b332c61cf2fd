//! Expiring in-memory cache for environment-derived lists
//!
//! Reading and normalizing PATH is cheap but not free, and a batch of
//! resolutions would otherwise repeat it per name. Records live in memory
//! only and do not survive the process.
//!
//! | Slot | Key | Default TTL |
//! |------|-----|-------------|
//! | PATH directories | `path.directories` | 5 minutes |
//! | PATHEXT extensions | `path.extensions` | 10 minutes |

mod path_cache;
mod ttl;

pub use path_cache::{
    CacheLifetimes, CachedPathSource, DEFAULT_DIRECTORIES_TTL, DEFAULT_EXTENSIONS_TTL,
    DIRECTORIES_KEY, EXTENSIONS_KEY,
};
pub use ttl::TtlCache;

//! CLI command implementations

pub mod completions;
pub mod config;
pub mod drives;
pub mod find;
pub mod list;
pub mod path;
mod report;
pub mod search;

pub use completions::execute as completions;
pub use config::execute as config;
pub use drives::execute as drives;
pub use find::execute as find;
pub use list::execute as list;
pub use path::execute as path;
pub use search::execute as search;

use crate::cli::args::WalkArgs;
use crate::config::Config;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Apply per-invocation walk flags on top of the loaded configuration
fn apply_walk_args(config: &Config, walk: &WalkArgs) -> Config {
    let mut config = config.clone();
    if let Some(depth) = walk.depth {
        config.search.depth = depth;
    }
    if let Some(secs) = walk.timeout {
        config.search.timeout_secs = Some(secs);
    }
    if walk.scripts {
        config.search.accept_scripts = true;
    }
    config
}

/// Cancel `token` on Ctrl-C, or once `timeout` elapses
fn spawn_canceller(token: CancellationToken, timeout: Option<Duration>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let expired = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::signal::ctrl_c() => debug!("Interrupted, stopping search"),
            _ = expired => debug!("Timeout reached, stopping search"),
        }
        token.cancel();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchDepth;

    #[test]
    fn walk_args_override_config() {
        let walk = WalkArgs {
            depth: Some(SearchDepth::Levels(2)),
            timeout: Some(5),
            scripts: true,
        };
        let config = apply_walk_args(&Config::default(), &walk);
        assert_eq!(config.search.depth, SearchDepth::Levels(2));
        assert_eq!(config.search.timeout_secs, Some(5));
        assert!(config.search.accept_scripts);
    }

    #[test]
    fn absent_walk_args_keep_config() {
        let mut base = Config::default();
        base.search.depth = SearchDepth::TopOnly;
        let walk = WalkArgs {
            depth: None,
            timeout: None,
            scripts: false,
        };
        let config = apply_walk_args(&base, &walk);
        assert_eq!(config.search.depth, SearchDepth::TopOnly);
        assert_eq!(config.search.timeout_secs, None);
        assert!(!config.search.accept_scripts);
    }

    #[tokio::test(start_paused = true)]
    async fn canceller_fires_after_timeout() {
        let token = CancellationToken::new();
        let handle = spawn_canceller(token.clone(), Some(Duration::from_secs(3)));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!token.is_cancelled());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(token.is_cancelled());
        handle.await.unwrap();
    }
}

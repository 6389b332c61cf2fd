//! whatexec - locate executables
//!
//! Resolves names through PATH the way `which`/`where` do, confirms each
//! candidate by its binary header, and falls back to walking every local
//! drive for names PATH cannot resolve.
//!
//! ```rust,ignore
//! use whatexec::config::Config;
//! use whatexec::engine::ResolutionEngine;
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = ResolutionEngine::from_config(&Config::default())?;
//! let outcome = engine.find_many(&["git", "cargo"], &CancellationToken::new()).await;
//! for result in &outcome.results {
//!     println!("{} -> {:?}", result.name, result.best());
//! }
//! ```

pub mod blocking;
pub mod cache;
pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod environment;
pub mod error;
pub mod events;
pub mod platform;
pub mod query;
pub mod rank;
pub mod resolve;
pub mod search;
pub mod ui;

pub use engine::{BatchOutcome, ResolutionEngine, ResolveRequest};
pub use error::{WhatExecError, WhatExecResult};

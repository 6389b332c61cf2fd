//! Search-path environment
//!
//! Turns the PATH and PATHEXT variables into the ordered directory and
//! extension lists that PATH resolution walks.

mod reader;

pub use reader::{
    EnvSource, PathEnvironmentReader, PathSource, ProcessEnv, StaticEnv, DEFAULT_PATHEXT,
};

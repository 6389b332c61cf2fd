//! Terminal presentation
//!
//! Uses `cliclack` for prompts and status lines and `indicatif` for the
//! search spinner, falling back to plain stderr output in CI or when
//! output is piped.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{intro, remark, step_info, step_ok_detail, step_warn, step_warn_hint};
pub use progress::{SearchProgress, SearchSummary};
pub use prompts::confirm;
pub use theme::{init_theme, WhatExecTheme};

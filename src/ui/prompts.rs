//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{WhatExecError, WhatExecResult};

/// Prompt for confirmation, returns default if non-interactive
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> WhatExecResult<bool> {
    if !ctx.is_interactive() {
        return Ok(default);
    }

    // Run blocking cliclack prompt in spawn_blocking
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| WhatExecError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| WhatExecError::User(format!("Prompt failed: {}", e)))
}

use crate::cli::CompletionArgs;
use crate::client::{CompletionBackend, OpenRouterClient};
use crate::server::{AppState, run_server};
use crate::session::{AccessGate, SessionContext};
use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use super::CommandContext;
use super::utils::{resolve_secrets, resolve_settings};

pub fn handle_serve(
    ctx: &CommandContext,
    port: Option<u16>,
    completion: CompletionArgs,
    password: Option<String>,
) -> Result<()> {
    let settings = resolve_settings(&ctx.config, &completion);
    let secrets = resolve_secrets(&completion, password);
    let port = port.unwrap_or(ctx.config.server.port);

    // The blocking client must be created and dropped outside the runtime
    let backend: Arc<dyn CompletionBackend> =
        Arc::new(OpenRouterClient::new(&settings, secrets.require_api_key()?)?);
    let gate = AccessGate::new(secrets.access_password.clone());
    let gated = gate.is_enabled();

    let state = AppState::new(backend.clone(), SessionContext::new(gate))
        .with_export_filename(ctx.config.output.export_filename.clone());

    println!("Starting prioritizer server on http://localhost:{}", port);
    println!("  Model: {}", settings.model.cyan());
    if gated {
        println!("  Access password required after the free trial");
    }

    let result = tokio::runtime::Runtime::new()?.block_on(run_server(state, port));
    drop(backend);
    result?;
    Ok(())
}

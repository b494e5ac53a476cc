//! LARUbot widget server
//!
//! Paints the chat page, serves translations and knowledge bases under
//! `/static`, and forwards `/ask` to the answering backend.

#[cfg(not(target_arch = "wasm32"))]
use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[cfg(not(target_arch = "wasm32"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;

    use larubot_widget::{config::AppConfig, server, telemetry};

    // Load .env (if present)
    let _ = dotenvy::dotenv();

    telemetry::init();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            return Err(e.into());
        }
    };

    tracing::info!(
        name: "config.loaded",
        languages = ?config.widget.languages,
        escape_html = config.widget.escape_html,
        "Configuration loaded"
    );

    server::start_server(Arc::new(config)).await
}

#[cfg(target_arch = "wasm32")]
fn main() {}

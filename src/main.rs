use std::sync::Arc;
use std::thread;
use std::time::Duration;

use adventure_forge::config::{AppConfig, Backend};
use adventure_forge::engine::llm_client::OpenAiCompatibleClient;
use adventure_forge::engine::narrative_service::{
    narrator_from_config, NarrativeService, UnavailableNarrator,
};
use adventure_forge::ui::app::AdventureApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load();
    let history_limit = config.history_limit;

    if config.backend == Backend::OpenAiCompatible {
        probe_local_server(&config);
    }

    // A broken backend still opens the window; the error shows on first use.
    let narrator: Arc<dyn NarrativeService> = match narrator_from_config(&config) {
        Ok(narrator) => narrator,
        Err(e) => {
            tracing::warn!(error = %e, "narrative backend unavailable");
            Arc::new(UnavailableNarrator(e))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Adventure Forge")
            .with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Adventure Forge",
        options,
        Box::new(move |cc| {
            Ok(Box::new(AdventureApp::new(cc, narrator, history_limit)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the window: {e}"))
}

/// Pings the local server in the background. The result only goes to the log.
fn probe_local_server(config: &AppConfig) {
    let client = match OpenAiCompatibleClient::new(
        &config.openai_base_url,
        &config.openai_model,
        config.temperature,
        Some(Duration::from_secs(5)),
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "could not build probe client");
            return;
        }
    };

    thread::spawn(move || match client.test_connection() {
        Ok(status) => tracing::info!(%status, "local server reachable"),
        Err(e) => tracing::warn!(error = %e, "local server not reachable"),
    });
}

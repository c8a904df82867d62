use crate::shutdown;
use semester_calendar::components::editor::SessionSettings;
use semester_calendar::components::EditorHandle;
use semester_calendar::config::Config;
use semester_calendar::error::Error;
use semester_calendar::server::{build_router, AppState};
use semester_calendar::utils::i18n::set_locale;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Start the editor actor and serve the API until a shutdown signal arrives
pub async fn start_editor(config: Config) -> miette::Result<()> {
    let locale = set_locale(&config.locale);
    info!("Setting locale to {}", locale);

    let editor = EditorHandle::new(SessionSettings::from(&config));

    if let Some(path) = &config.initial_document {
        match editor.import_path(path).await {
            Ok(summary) => info!(
                "Loaded {} with {} events",
                path, summary.event_count
            ),
            Err(e) => warn!("Starting with an empty calendar, could not load {}: {}", path, e),
        }
    }

    let addr = config.socket_addr();
    let url = config.editor_url();
    let open_browser = config.open_browser;
    let app = build_router(AppState::new(editor.clone(), config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;
    info!("Listening on {}", addr);

    if open_browser {
        if let Err(e) = webbrowser::open(&url) {
            warn!("Could not open a browser at {}: {}", url, e);
        }
    }

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send).await;
    });

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_recv.await;
        })
        .await
        .map_err(Error::from);

    // In-flight requests are done, stop the actor
    if let Err(e) = editor.shutdown().await {
        error!("Error shutting down editor: {:?}", e);
    } else {
        info!("Editor shut down successfully");
    }

    served?;
    Ok(())
}

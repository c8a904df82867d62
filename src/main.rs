mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting semester calendar editor");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the editor
    startup::start_editor(config).await
}

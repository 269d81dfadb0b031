use anyhow::Result;
use tracing_subscriber::EnvFilter;

use chess_rules::protocol::CommandHandler;
use chess_rules::SessionConfig;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean command channel
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env()?;
    tracing::debug!(?config, "starting command loop");

    let mut handler = CommandHandler::new(config);
    handler.run()
}

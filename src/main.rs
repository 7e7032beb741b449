use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use callhome::config::CONFIG;
use callhome::records::JsonFileStore;
use callhome::server::CallhomeServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("callhome=info")),
        )
        .init();

    let (listen_host, listen_port, records_path) = {
        let config = CONFIG.lock().unwrap();
        (
            config.listen_host.clone(),
            config.listen_port,
            config.records_path.clone(),
        )
    };

    info!("recording caller addresses to {}", records_path);

    let store = Arc::new(JsonFileStore::new(&records_path));
    let server = CallhomeServer::new(store);

    server.start(&listen_host, listen_port).await?;

    Ok(())
}

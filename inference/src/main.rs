use std::sync::Arc;

use inference::{Config, HttpModelSource, InferenceNode, router};
use log::info;
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    let list = TcpListener::bind(&addr).await?;
    info!(param_server = config.param_server_url.as_str(); "inference node listening at {addr}");

    let source = HttpModelSource::new(&config.param_server_url, config.fetch_timeout);
    let app = router(Arc::new(InferenceNode::new(source)));
    axum::serve(list, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("received SIGTERM");
        })
        .await?;

    Ok(())
}

use std::sync::Arc;

use log::info;
use parameter_server::{Config, ModelPool, router};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    let list = TcpListener::bind(&addr).await?;
    info!("parameter server listening at {addr}");

    let app = router(Arc::new(ModelPool::new()));
    axum::serve(list, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("received SIGTERM");
        })
        .await?;

    Ok(())
}

use std::sync::Arc;

use comms::PeerClient;
use log::info;
use machine_learning::forest::RandomForestLearner;
use tokio::{net::TcpListener, signal};
use worker::{Config, HttpModelSink, Worker, bootstrap, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    let list = TcpListener::bind(&addr).await?;
    info!(
        trees = config.forest.n_trees,
        param_server = config.param_server_url.as_str();
        "worker listening at {addr}"
    );

    let sink = HttpModelSink::new(&config.param_server_url, config.push_timeout);
    let worker = Arc::new(Worker::new(RandomForestLearner::new(config.forest), sink));

    let announce = config.clone();
    tokio::spawn(async move {
        let _ = bootstrap::register(
            &PeerClient::new(),
            &announce.coordinator_url,
            &announce.worker_url,
            announce.register_timeout,
        )
        .await;
    });

    axum::serve(list, router(worker))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("received SIGTERM");
        })
        .await?;

    Ok(())
}

use std::{sync::Arc, time::Duration};

use axum::{Json, Router, extract::State, routing::post};
use comms::specs::{
    coordinator::{RegisterWorkerResponse, UploadResponse, UploadSummary},
    inference::AccuracyResponse,
    server::ModelsResponse,
    worker::{TrainRequest, TrainResponse},
};
use inference::{HttpModelSource, InferenceNode};
use machine_learning::forest::RandomForestLearner;
use orchestrator::{Config, Coordinator, dispatch::DispatchPolicy, router};
use parameter_server::ModelPool;
use parking_lot::Mutex;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::json;
use tokio::net::TcpListener;
use worker::{HttpModelSink, Worker};

type Received = Arc<Mutex<Vec<TrainRequest>>>;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

/// A worker that records every shard and answers after `delay`.
async fn stub_worker(delay: Duration) -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/train",
            post(move |State(received): State<Received>, Json(req): Json<TrainRequest>| async move {
                tokio::time::sleep(delay).await;
                received.lock().push(req);
                Json(TrainResponse::success())
            }),
        )
        .with_state(received.clone());
    (serve(app).await, received)
}

fn config(param_server: &str, inference: &str) -> Config {
    Config {
        param_server_url: param_server.into(),
        inference_url: inference.into(),
        dispatch: DispatchPolicy {
            call_timeout: Duration::from_secs(10),
            round_deadline: Duration::from_secs(20),
            max_in_flight: 4,
        },
        ..Config::default()
    }
}

async fn spawn_coordinator(config: Config) -> String {
    serve(router(Arc::new(Coordinator::new(config)))).await
}

/// `rows` rows with three numeric features, one text column and a
/// two-class textual label decided by `f1`.
fn table(rows: usize) -> String {
    let mut csv = String::from("f1, f2 ,note,f3,label\n");
    for i in 0..rows {
        let label = if i < rows / 2 { "no" } else { "yes" };
        csv.push_str(&format!("{i},{},n{i},{},{label}\n", i % 7, (i * 3) % 11));
    }
    csv
}

async fn register(client: &Client, coordinator: &str, worker_url: &str) -> RegisterWorkerResponse {
    client
        .post(format!("{coordinator}/register-worker"))
        .json(&json!({ "worker_url": worker_url }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn upload(client: &Client, coordinator: &str, csv: String, target: &str) -> UploadResponse {
    let form = Form::new()
        .part("file", Part::bytes(csv.into_bytes()).file_name("data.csv"))
        .text("target", target.to_string());

    client
        .post(format!("{coordinator}/upload-csv"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn accepted(res: UploadResponse) -> UploadSummary {
    match res {
        UploadResponse::Accepted(summary) => summary,
        UploadResponse::Failed(e) => panic!("upload failed: {}", e.error),
    }
}

fn refused(res: UploadResponse) -> String {
    match res {
        UploadResponse::Failed(e) => e.error,
        UploadResponse::Accepted(summary) => panic!("upload accepted: {summary:?}"),
    }
}

async fn check_accuracy(client: &Client, coordinator: &str) -> AccuracyResponse {
    client
        .get(format!("{coordinator}/check-accuracy"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_worker_round_end_to_end() {
    let pool = Arc::new(ModelPool::new());
    let param_server = serve(parameter_server::router(pool.clone())).await;

    let sink = HttpModelSink::new(&param_server, Duration::from_secs(5));
    let trainer = Worker::new(RandomForestLearner::default(), sink);
    let worker_url = serve(worker::router(Arc::new(trainer))).await;

    let source = HttpModelSource::new(&param_server, Duration::from_secs(5));
    let inference = serve(inference::router(Arc::new(InferenceNode::new(source)))).await;

    let coordinator = spawn_coordinator(config(&param_server, &inference)).await;
    let client = Client::new();

    assert_eq!(register(&client, &coordinator, &worker_url).await.total_workers, 1);

    let summary = accepted(upload(&client, &coordinator, table(100), "label").await);
    assert_eq!(summary.active_workers, 1);
    assert_eq!(summary.columns_used, ["f1", "f2", "f3"]);
    assert_eq!(summary.target, "label");
    assert_eq!((summary.train_rows, summary.eval_rows), (80, 20));
    assert_eq!(summary.classes, Some(vec!["no".into(), "yes".into()]));
    assert_eq!(summary.dispatch.len(), 1);
    assert_eq!(summary.dispatch[0].worker_id, "Worker-1");
    assert_eq!(summary.dispatch[0].outcome, "delivered");

    let models: ModelsResponse = client
        .get(format!("{param_server}/get-models"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(models.count, 1);
    assert_eq!(models.round, summary.round);

    let res = check_accuracy(&client, &coordinator).await;
    assert_eq!(res.total_models_voting, Some(1));
    assert!(res.message.is_none());

    let matrix = res.confusion_matrix.unwrap();
    assert_eq!(matrix.iter().flatten().sum::<u64>(), 20);
}

#[tokio::test]
async fn shards_are_balanced_across_workers() {
    let (a, received_a) = stub_worker(Duration::ZERO).await;
    let (b, received_b) = stub_worker(Duration::ZERO).await;
    let param_server = serve(parameter_server::router(Arc::new(ModelPool::new()))).await;
    let coordinator = spawn_coordinator(config(&param_server, &closed_url().await)).await;
    let client = Client::new();

    register(&client, &coordinator, &a).await;
    register(&client, &coordinator, &b).await;

    let summary = accepted(upload(&client, &coordinator, table(101), "label").await);
    assert_eq!((summary.train_rows, summary.eval_rows), (81, 20));

    let rows: Vec<_> = summary.dispatch.iter().map(|r| r.rows).collect();
    assert_eq!(rows, [41, 40]);

    let a = received_a.lock();
    let b = received_b.lock();
    assert_eq!(a[0].worker_id, "Worker-1");
    assert_eq!(b[0].worker_id, "Worker-2");
    assert_eq!(a[0].features.len() + b[0].features.len(), 81);
    assert_eq!(a[0].features[0].len(), 3);
    assert_eq!(a[0].round, Some(summary.round));
}

#[tokio::test]
async fn unreachable_param_server_does_not_stop_the_round() {
    let (worker, received) = stub_worker(Duration::ZERO).await;
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;
    let client = Client::new();

    register(&client, &coordinator, &worker).await;
    let summary = accepted(upload(&client, &coordinator, table(30), "label").await);

    assert_eq!(summary.dispatch[0].outcome, "delivered");
    // Without an acknowledged round the shard is sent untagged.
    assert_eq!(received.lock()[0].round, None);
}

#[tokio::test]
async fn failed_deliveries_are_reported_per_worker() {
    let (fast, _) = stub_worker(Duration::ZERO).await;
    let (slow, _) = stub_worker(Duration::from_secs(5)).await;
    let gone = closed_url().await;

    let mut config = config(&closed_url().await, &closed_url().await);
    config.dispatch.call_timeout = Duration::from_millis(300);
    let coordinator = spawn_coordinator(config).await;
    let client = Client::new();

    for url in [&fast, &gone, &slow] {
        register(&client, &coordinator, url).await;
    }

    let summary = accepted(upload(&client, &coordinator, table(50), "label").await);
    let outcomes: Vec<_> = summary.dispatch.iter().map(|r| r.outcome.as_str()).collect();

    assert_eq!(outcomes, ["delivered", "unreachable", "timed_out"]);
    assert!(summary.dispatch[1].detail.is_some());
    assert_eq!(summary.active_workers, 3);
}

#[tokio::test]
async fn round_deadline_bounds_the_whole_dispatch() {
    let (slow, _) = stub_worker(Duration::from_secs(5)).await;

    let mut config = config(&closed_url().await, &closed_url().await);
    config.dispatch.round_deadline = Duration::from_millis(300);
    let coordinator = spawn_coordinator(config).await;
    let client = Client::new();

    register(&client, &coordinator, &slow).await;

    let started = std::time::Instant::now();
    let summary = accepted(upload(&client, &coordinator, table(20), "label").await);

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(summary.dispatch[0].outcome, "timed_out");
}

#[tokio::test]
async fn same_table_same_shards() {
    let (worker, received) = stub_worker(Duration::ZERO).await;
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;
    let client = Client::new();

    register(&client, &coordinator, &worker).await;
    accepted(upload(&client, &coordinator, table(60), "label").await);
    accepted(upload(&client, &coordinator, table(60), "label").await);

    let received = received.lock();
    assert_eq!(received[0].features, received[1].features);
    assert_eq!(received[0].targets, received[1].targets);
}

#[tokio::test]
async fn upload_without_workers_is_refused() {
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;

    let error = refused(upload(&Client::new(), &coordinator, table(10), "label").await);
    assert_eq!(error, "No workers available");
}

#[tokio::test]
async fn unknown_target_lists_the_columns() {
    let (worker, received) = stub_worker(Duration::ZERO).await;
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;
    let client = Client::new();

    register(&client, &coordinator, &worker).await;
    let error = refused(upload(&client, &coordinator, table(10), "species").await);

    assert!(error.contains("'species'"));
    assert!(error.contains("f1, f2, note, f3, label"));
    assert!(received.lock().is_empty());
}

#[tokio::test]
async fn unreadable_upload_is_refused() {
    let (worker, _) = stub_worker(Duration::ZERO).await;
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;
    let client = Client::new();

    register(&client, &coordinator, &worker).await;
    let error = refused(upload(&client, &coordinator, "a,label\n".into(), "label").await);

    assert!(error.starts_with("Failed to parse table"));
}

#[tokio::test]
async fn accuracy_before_any_upload_asks_for_data() {
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;

    let res = check_accuracy(&Client::new(), &coordinator).await;
    assert_eq!(res, AccuracyResponse::failure("Upload data first"));
}

#[tokio::test]
async fn unreachable_inference_node_answers_zero_accuracy() {
    let (worker, _) = stub_worker(Duration::ZERO).await;
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;
    let client = Client::new();

    register(&client, &coordinator, &worker).await;
    accepted(upload(&client, &coordinator, table(20), "label").await);

    let res = check_accuracy(&client, &coordinator).await;
    assert_eq!(res.accuracy, 0.0);
    assert!(res.message.unwrap().starts_with("Inference node unavailable"));
}

#[tokio::test]
async fn registration_is_idempotent() {
    let coordinator = spawn_coordinator(config(&closed_url().await, &closed_url().await)).await;
    let client = Client::new();

    assert_eq!(register(&client, &coordinator, "http://w1:8002").await.total_workers, 1);
    assert_eq!(register(&client, &coordinator, "http://w2:8002").await.total_workers, 2);
    assert_eq!(register(&client, &coordinator, "http://w1:8002").await.total_workers, 2);
}

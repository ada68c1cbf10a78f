use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

use wk_reporter::events::{Activity, ActivityKind};
use wk_reporter::project::Project;
use wk_reporter::transport::http::HttpTransport;
use wk_reporter::{Delivery, Reporter};

const API_KEY: &str = "waka_test-key";

#[derive(Debug, Clone)]
struct Received {
    query: HashMap<String, String>,
    machine: Option<String>,
    user_agent: Option<String>,
    auth: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

/// Answers like the real endpoint: entities named "dup" are duplicates,
/// "broken" gets an error, everything else is stored.
fn fake_server() -> (SocketAddr, Log) {
    let log: Log = Arc::default();
    let store = Arc::clone(&log);

    let route = warp::post()
        .and(warp::path!("api" / "v1" / "users" / "current" / "heartbeats"))
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::header::optional::<String>("x-machine-name"))
        .and(warp::header::optional::<String>("user-agent"))
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .map(move |query, machine, user_agent, auth, body: Value| {
            let entity = body["entity"].as_str().unwrap_or_default().to_owned();
            let time = body["time"].clone();
            let id = format!("hb-{}", store.lock().len());

            store.lock().push(Received {
                query,
                machine,
                user_agent,
                auth,
                body,
            });

            let (reply, status) = match entity.as_str() {
                "dup" => (json!({ "error": "Duplicate" }), StatusCode::CONFLICT),
                "broken" => (json!({ "error": "Can not save heartbeat" }), StatusCode::BAD_REQUEST),
                _ => (
                    json!({ "data": { "id": id, "entity": entity, "type": "file", "time": time } }),
                    StatusCode::CREATED,
                ),
            };
            warp::reply::with_status(warp::reply::json(&reply), status)
        });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    (addr, log)
}

fn reporter(addr: SocketAddr) -> Reporter<HttpTransport> {
    let transport = HttpTransport::new(
        &format!("http://{}/api/v1/", addr),
        API_KEY,
        "unity/2022.3.10f1 (linux-x86_64) wk-reporter/0.1.0",
        "build box",
    )
    .unwrap();

    Reporter::new(Project::named("Demo"), transport, tokio::runtime::Handle::current())
}

fn activity(kind: ActivityKind, entity: &str) -> Activity {
    Activity::new(kind, Some(entity))
}

async fn record(reporter: &Reporter<HttpTransport>, a: &Activity, now: f64) -> Option<Delivery> {
    match reporter.record_at(a, now) {
        Some(pending) => Some(pending.await.unwrap()),
        None => None,
    }
}

#[tokio::test]
async fn sends_heartbeat_in_wire_format() {
    let (addr, log) = fake_server();
    let reporter = reporter(addr);

    let opened = activity(ActivityKind::SceneOpened, "/proj/Scene.unity");
    let delivery = record(&reporter, &opened, 1000.0).await;
    assert!(matches!(delivery, Some(Delivery::Accepted(_))));

    let received = log.lock()[0].clone();
    assert_eq!(received.query.get("api_key").map(String::as_str), Some(API_KEY));
    assert_eq!(received.machine.as_deref(), Some("build%20box"));
    assert!(received.user_agent.unwrap().starts_with("unity/2022.3.10f1"));
    assert_eq!(
        received.auth.as_deref(),
        Some(format!("Basic {}", base64::encode(API_KEY)).as_str())
    );
    assert_eq!(
        received.body,
        json!({
            "entity": "/proj/Scene.unity",
            "type": "file",
            "category": "designing",
            "time": 1000.0,
            "project": "Demo",
            "branch": "master",
            "language": "Unity",
            "is_write": false,
        })
    );

    let ack = reporter.gate().last_ack().unwrap();
    assert_eq!(ack.id, "hb-0");
    assert_eq!(ack.time, 1000.0);
}

#[tokio::test]
async fn repeated_activity_is_debounced_until_cooldown() {
    let (addr, log) = fake_server();
    let reporter = reporter(addr);
    let changed = activity(ActivityKind::HierarchyChanged, "Assets/Main.unity");

    assert!(record(&reporter, &changed, 1000.0).await.is_some());
    assert!(record(&reporter, &changed, 1030.0).await.is_none());
    assert!(record(&reporter, &changed, 1099.5).await.is_none());
    assert!(record(&reporter, &activity(ActivityKind::SceneSaved, "Assets/Main.unity"), 1100.0)
        .await
        .is_some());
    assert!(record(&reporter, &changed, 1219.0).await.is_none());
    assert!(record(&reporter, &changed, 1220.0).await.is_some());

    let log = log.lock();
    assert_eq!(log.len(), 3);
    assert_eq!(log[1].body["is_write"], true);
}

#[tokio::test]
async fn duplicate_and_errors_leave_window_alone() {
    let (addr, log) = fake_server();
    let reporter = reporter(addr);

    record(&reporter, &activity(ActivityKind::SceneOpened, "a.unity"), 1000.0).await;
    let before = reporter.gate().last_ack();

    let dup = record(&reporter, &activity(ActivityKind::SceneOpened, "dup"), 1001.0).await;
    assert_eq!(dup, Some(Delivery::Duplicate));
    assert_eq!(reporter.gate().last_ack(), before);

    let broken = record(&reporter, &activity(ActivityKind::SceneOpened, "broken"), 1002.0).await;
    assert_eq!(broken, Some(Delivery::Rejected("Can not save heartbeat".to_owned())));
    assert_eq!(reporter.gate().last_ack(), before);

    // the duplicate never became the last ack, so it is admitted again
    assert!(record(&reporter, &activity(ActivityKind::SceneOpened, "dup"), 1003.0).await.is_some());
    assert_eq!(log.lock().len(), 4);
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    // a port that was just released has no listener
    let addr = std::net::TcpListener::bind(("127.0.0.1", 0))
        .unwrap()
        .local_addr()
        .unwrap();
    let transport = HttpTransport::new(&format!("http://{}", addr), API_KEY, "ua", "host").unwrap();
    let offline = Reporter::new(Project::named("Demo"), transport, tokio::runtime::Handle::current());
    let changed = activity(ActivityKind::SceneOpened, "a.unity");

    assert_eq!(record(&offline, &changed, 1000.0).await, Some(Delivery::Unreachable));
    assert_eq!(offline.gate().last_ack(), None);
    assert_eq!(record(&offline, &changed, 1001.0).await, Some(Delivery::Unreachable));
}

use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    due_date: String,
    amount: f64,
    recurring: Option<String>,
    status: String,
    mode: String,
    recurring_processed: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    item: Item,
    successor: Option<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemView {
    id: String,
    status: String,
    due_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView {
    mode: String,
    upcoming: Vec<ItemView>,
    items: Vec<ItemView>,
    monthly_total: String,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("clario_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/dashboard")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_clario"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_item(client: &Client, server: &TestServer, body: serde_json::Value) -> Item {
    let response = client
        .post(format!("{}/api/items", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn list_items(client: &Client, server: &TestServer) -> Vec<Item> {
    client
        .get(format!("{}/api/items", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn set_mode(client: &Client, server: &TestServer, mode: &str) -> DashboardView {
    let response = client
        .post(format!("{}/api/mode", server.base_url))
        .json(&json!({ "mode": mode }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_completing_recurring_item_adds_one_successor() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let item = create_item(
        &client,
        &server,
        json!({
            "title": "Office rent",
            "type": "payment",
            "dueDate": "2024-01-31",
            "amount": "1500",
            "recurring": "monthly",
            "mode": "business"
        }),
    )
    .await;
    assert_eq!(item.status, "upcoming");
    assert_eq!(item.amount, 1500.0);
    assert!(!item.recurring_processed);

    let first: CompletionResponse = client
        .post(format!("{}/api/items/{}/done", server.base_url, item.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.item.status, "done");
    assert!(first.item.recurring_processed);
    let successor = first.successor.expect("monthly item should recur");
    assert_eq!(successor.due_date, "2024-03-02");
    assert_eq!(successor.status, "upcoming");
    assert_eq!(successor.title, "Office rent");
    assert_eq!(successor.mode, "business");
    assert_eq!(successor.recurring.as_deref(), Some("monthly"));
    assert_ne!(successor.id, item.id);

    let second: CompletionResponse = client
        .post(format!("{}/api/items/{}/done", server.base_url, item.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(second.successor.is_none());

    let items = list_items(&client, &server).await;
    let copies = items
        .iter()
        .filter(|i| i.title == "Office rent" && i.status == "upcoming")
        .count();
    assert_eq!(copies, 1);
}

#[tokio::test]
async fn http_delete_removes_only_that_item() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let keep = create_item(
        &client,
        &server,
        json!({ "title": "Keep me", "type": "task", "dueDate": "2024-06-01", "mode": "personal" }),
    )
    .await;
    let gone = create_item(
        &client,
        &server,
        json!({ "title": "Drop me", "type": "task", "dueDate": "2024-06-02", "mode": "personal" }),
    )
    .await;

    let response = client
        .delete(format!("{}/api/items/{}", server.base_url, gone.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let items = list_items(&client, &server).await;
    assert!(items.iter().all(|i| i.id != gone.id));
    let kept = items.iter().find(|i| i.id == keep.id).expect("kept item");
    assert_eq!(kept.title, "Keep me");
    assert_eq!(kept.kind, "task");
    assert_eq!(kept.due_date, "2024-06-01");

    let again = client
        .delete(format!("{}/api/items/{}", server.base_url, gone.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_dashboard_follows_mode() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = set_mode(&client, &server, "personal").await;
    let before_total: f64 = before.monthly_total.parse().unwrap();

    create_item(
        &client,
        &server,
        json!({ "title": "Phone", "type": "payment", "dueDate": "2024-07-01", "amount": 10, "mode": "personal" }),
    )
    .await;
    create_item(
        &client,
        &server,
        json!({ "title": "Server", "type": "payment", "dueDate": "2024-07-01", "amount": 5, "mode": "business" }),
    )
    .await;
    create_item(
        &client,
        &server,
        json!({ "title": "Errand", "type": "task", "dueDate": "2024-07-01", "amount": 99, "mode": "personal" }),
    )
    .await;

    let personal: DashboardView = client
        .get(format!("{}/api/dashboard", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(personal.mode, "personal");
    let total: f64 = personal.monthly_total.parse().unwrap();
    assert!((total - before_total - 10.0).abs() < 1e-9);
    assert!(personal.upcoming.len() <= 5);
    assert!(personal.upcoming.iter().all(|item| item.status == "upcoming"));
    assert!(personal
        .upcoming
        .windows(2)
        .all(|pair| pair[0].due_date <= pair[1].due_date));

    let business = set_mode(&client, &server, "business").await;
    assert_eq!(business.mode, "business");
    let items = list_items(&client, &server).await;
    for view in &business.items {
        let item = items.iter().find(|i| i.id == view.id).unwrap();
        assert_eq!(item.mode, "business");
    }

    set_mode(&client, &server, "personal").await;
}

#[tokio::test]
async fn http_form_submission_adds_item_and_renders_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/items", server.base_url))
        .form(&[
            ("title", "Form bill"),
            ("type", "payment"),
            ("dueDate", "2024-08-15"),
            ("amount", "not-a-number"),
            ("recurring", ""),
            ("reminder", "on"),
            ("mode", "personal"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let page = response.text().await.unwrap();
    assert!(page.contains("Clario"));

    let items = list_items(&client, &server).await;
    let item = items.iter().find(|i| i.title == "Form bill").expect("form item");
    assert_eq!(item.amount, 0.0);
    assert_eq!(item.recurring, None);
}

#[tokio::test]
async fn http_rejects_invalid_items() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/items", server.base_url))
        .json(&json!({ "title": "", "type": "task", "dueDate": "2024-01-01", "mode": "personal" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/mode", server.base_url))
        .json(&json!({ "mode": "family" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_mutations_are_written_to_the_items_file() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let item = create_item(
        &client,
        &server,
        json!({ "title": "Persisted", "type": "task", "dueDate": "2024-09-09", "mode": "business" }),
    )
    .await;

    let raw = std::fs::read_to_string(&server.data_path).unwrap();
    let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    let entry = stored
        .iter()
        .find(|entry| entry["id"] == item.id.as_str())
        .expect("item in file");
    assert_eq!(entry["type"], "task");
    assert_eq!(entry["dueDate"], "2024-09-09");
    assert_eq!(entry["recurring"], serde_json::Value::Null);
    assert_eq!(entry["recurringProcessed"], false);
    assert!(entry["createdAt"].is_string());
}

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Request body limit the test server is started with
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kol-progress-api"));
        cmd.env("KOL_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("PROGRESS_STORE", "memory")
            .env("API_MAX_REQUEST_SIZE_BYTES", BODY_LIMIT_BYTES.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Create a customer under a fresh KOL and return (kol_id, customer_id)
pub async fn create_customer(server: &TestServer, name: &str) -> Result<(String, String)> {
    let kol_id = uuid::Uuid::new_v4().to_string();
    let id = create_customer_for(server, &kol_id, json!({ "name": name })).await?;
    Ok((kol_id, id))
}

pub async fn create_customer_for(server: &TestServer, kol_id: &str, mut body: Value) -> Result<String> {
    body["kolId"] = json!(kol_id);
    let res = reqwest::Client::new()
        .post(server.url("/api/customers"))
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    body["data"]["id"]
        .as_str()
        .map(str::to_string)
        .context("created customer has no id")
}

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

/// Secret shared between the tests and the spawned server
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn(extra_env: &[(String, String)]) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/manda-tasks-api");
        cmd.env("MANDA_API_PORT", port.to_string())
            .env("SECURITY_JWT_SECRET", TEST_JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    // The server is up even when the task store is not
                    if resp.status() == StatusCode::OK
                        || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                    {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }

    pub fn stop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Shared server for tests that do not need a live task store. It is pointed
/// at a dead port so store-dependent paths fail fast and deterministically.
pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| {
        let dead_port = portpicker::pick_unused_port().expect("failed to pick free port");
        let env = [(
            "STORE_BASE_URL".to_string(),
            format!("http://127.0.0.1:{}", dead_port),
        )];
        TestServer::spawn(&env).expect("failed to spawn server binary")
    });
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

fn sign(claims: &serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding")
}

/// A token the server accepts: signed with the shared secret, expiring in an hour
pub fn bearer_token(sub: &str, name: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({ "sub": sub, "exp": now + 3600, "iat": now });
    if let Some(name) = name {
        claims["name"] = json!(name);
    }
    sign(&claims, TEST_JWT_SECRET)
}

/// Correctly signed but expired well past any verification leeway
pub fn expired_bearer_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({ "sub": sub, "exp": now - 7200, "iat": now - 10800 });
    sign(&claims, TEST_JWT_SECRET)
}

/// Well-formed token signed with a secret the server does not know
pub fn wrongly_signed_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({ "sub": sub, "exp": now + 3600, "iat": now });
    sign(&claims, "not-the-server-secret")
}

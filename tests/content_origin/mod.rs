use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

/// A recorded request: path and `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub path: String,
    pub accept: Option<String>,
}

/// Static content origin serving `docs/`, `blogs/` and the manifest.
///
/// `/docs/broken.md` answers 500, `/docs/retired.md` answers 410, everything
/// not registered answers 404.
pub struct ContentOrigin {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

pub fn default_files() -> HashMap<String, String> {
    let mut files = HashMap::new();
    files.insert(
        "/docs/guides/intro.md".to_owned(),
        "---\ntitle: Introduction\ndescription: Start here\norder: 1\n---\n# Welcome\n\n<script>alert(1)</script>\n\n```rust\nfn main() {}\n```\n".to_owned(),
    );
    files.insert(
        "/docs/guides/deploy.md".to_owned(),
        "---\ntitle: Deploy\norder: 2\n---\n## Deploy\n\nShip it.\n".to_owned(),
    );
    files.insert(
        "/docs/quickstart.md".to_owned(),
        "---\ntitle: Quickstart\norder: -1\n---\nGo fast.\n".to_owned(),
    );
    files.insert(
        "/blogs/launch.md".to_owned(),
        "---\ntitle: Launch day\n---\nWe launched.\n".to_owned(),
    );
    files.insert(
        "/docs/manifest.json".to_owned(),
        serde_json::json!({
            "docs": [
                {"slug": "guides/intro", "frontmatter": {"title": "Introduction", "order": 1}},
                {"slug": "guides/deploy", "frontmatter": {"title": "Deploy", "order": 2}},
                {"slug": "quickstart", "frontmatter": {"title": "Quickstart", "order": -1}}
            ]
        })
        .to_string(),
    );
    files
}

impl ContentOrigin {
    pub fn spawn() -> Self {
        Self::spawn_with(default_files())
    }

    pub fn spawn_with(files: HashMap<String, String>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start content origin");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_server = Arc::clone(&seen);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                let accept = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Accept"))
                    .map(|h| h.value.as_str().to_owned());
                seen_by_server
                    .lock()
                    .expect("lock seen requests")
                    .push(SeenRequest {
                        path: path.clone(),
                        accept,
                    });

                let response = match path.as_str() {
                    "/docs/broken.md" => {
                        tiny_http::Response::from_string("boom").with_status_code(500)
                    }
                    "/docs/retired.md" => {
                        tiny_http::Response::from_string("gone").with_status_code(410)
                    }
                    other => match files.get(other) {
                        Some(body) => tiny_http::Response::from_string(body.clone()),
                        None => tiny_http::Response::from_string("not found").with_status_code(404),
                    },
                };
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            seen,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("lock seen requests").clone()
    }
}

impl Drop for ContentOrigin {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

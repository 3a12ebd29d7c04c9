#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Test storage configuration.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub base_path: PathBuf,
}

impl TestStorage {
    /// A base directory that does not exist yet, inside a fresh temp dir.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let base_path = temp_dir.path().join("t");
        Self {
            temp_dir,
            base_path,
        }
    }

    pub fn base_path_str(&self) -> String {
        self.base_path.to_string_lossy().to_string()
    }

    pub fn stored_files(&self) -> Vec<PathBuf> {
        files_under(&self.base_path)
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Every regular file below `dir`, recursively.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files.sort();
    files
}

/// Whether `key` looks like `YYYY/MM/DD/{stem}_{digits}{ext}`.
pub fn is_date_sharded_key(key: &str, stem: &str, ext: &str) -> bool {
    let parts: Vec<&str> = key.split('/').collect();
    if parts.len() != 4 {
        return false;
    }
    let digits = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());
    if !digits(parts[0], 4) || !digits(parts[1], 2) || !digits(parts[2], 2) {
        return false;
    }

    let prefix = format!("{}_", stem);
    parts[3]
        .strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix(ext))
        .map(|nanos| !nanos.is_empty() && nanos.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Strip scheme and host from an object URL, leaving the key.
pub fn extract_key(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    match rest.split_once('/') {
        Some((_, key)) => key.to_string(),
        None => rest.to_string(),
    }
}

/// Minimal S3 endpoint on loopback that accepts every PUT and records the
/// request lines it receives.
pub struct MockS3 {
    pub endpoint: String,
    requests: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockS3 {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock endpoint");
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let requests = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve_connection(socket, log.clone()));
            }
        });

        Self { endpoint, requests }
    }

    /// `(method, raw path)` of every request seen so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|line| {
                let mut parts = line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();
                (method, path)
            })
            .collect()
    }
}

async fn serve_connection(
    socket: tokio::net::TcpStream,
    log: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
) {
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

    let mut reader = BufReader::new(socket);
    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
            return;
        }

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await.unwrap_or(0) == 0 {
                return;
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }

        log.lock().unwrap().push(request_line.trim_end().to_string());

        let response = "HTTP/1.1 200 OK\r\nETag: \"fileport\"\r\nContent-Length: 0\r\n\r\n";
        if reader.get_mut().write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

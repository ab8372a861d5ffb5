//! Retrieval of the source text a model is trained on.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Refuse bodies larger than this; a plain-text book is well below it.
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to fetch {url}: {message}")]
    Request { url: String, message: String },
    #[error("Failed to read response from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Content from {0} is not valid UTF-8")]
    Decode(String),
}

impl serde::Serialize for FetchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Where training text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn load(&self, timeout: Duration) -> Result<String, FetchError> {
        match self {
            Source::Url(url) => fetch_text(url, timeout),
            Source::File(path) => read_text_file(path),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Download a plain-text document with a blocking GET.
pub fn fetch_text(url: &str, timeout: Duration) -> Result<String, FetchError> {
    info!("Fetching {}", url);

    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent.get(url).call().map_err(|e| FetchError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let mut body = Vec::new();
    response
        .into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut body)
        .map_err(|source| FetchError::Read {
            url: url.to_string(),
            source,
        })?;

    info!("Fetched {} bytes from {}", body.len(), url);
    String::from_utf8(body).map_err(|_| FetchError::Decode(url.to_string()))
}

/// Read a local plain-text document.
pub fn read_text_file(path: &Path) -> Result<String, FetchError> {
    let bytes = std::fs::read(path).map_err(|source| FetchError::File {
        path: path.display().to_string(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| FetchError::Decode(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a local port and return its URL.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/words.txt", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        (url, handle)
    }

    #[test]
    fn test_read_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "cat dog elephant banana").unwrap();
        assert_eq!(read_text_file(&path).unwrap(), "cat dog elephant banana");
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();
        assert!(matches!(read_text_file(&path), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_file_source_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "zebra").unwrap();
        let source = Source::File(path.clone());
        assert_eq!(source.load(Duration::from_secs(1)).unwrap(), "zebra");
        assert_eq!(source.to_string(), path.display().to_string());
    }

    #[test]
    fn test_missing_file() {
        let err = read_text_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, FetchError::File { .. }));
        assert!(err.to_string().starts_with("Failed to read /definitely/not/here.txt"));
    }

    #[test]
    fn test_unreachable_url() {
        let err = fetch_text("http://127.0.0.1:9/words.txt", Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }

    #[test]
    fn test_http_error_status_is_a_request_error() {
        let (url, server) =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let err = fetch_text(&url, Duration::from_secs(5)).unwrap_err();
        server.join().unwrap();

        match err {
            FetchError::Request { url: failed, message } => {
                assert_eq!(failed, url);
                assert!(message.contains("404"), "unexpected message: {}", message);
            }
            other => panic!("expected a request error, got {:?}", other),
        }
    }

    #[test]
    fn test_fetches_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 12\r\nConnection: close\r\n\r\ncat elephant",
        );
        let text = fetch_text(&url, Duration::from_secs(5)).unwrap();
        server.join().unwrap();
        assert_eq!(text, "cat elephant");
    }
}

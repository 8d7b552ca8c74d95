use std::fmt;
use std::path::{Path, PathBuf};

use super::{Graph, LoadReport, RawDocument, gexf};
use crate::error::LoadError;

/// Where the graph document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    fn looks_like_gexf(&self) -> bool {
        let name = match self {
            DataSource::File(path) => path.to_string_lossy().to_lowercase(),
            DataSource::Url(url) => url.to_lowercase(),
        };
        name.ends_with(".gexf")
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Fetch the raw text of the document. A non-success HTTP status is an error.
pub async fn fetch(source: &DataSource) -> Result<String, LoadError> {
    match source {
        DataSource::File(path) => read_file(path).await,
        DataSource::Url(url) => {
            tracing::info!("Fetching graph from {}", url);
            let response = reqwest::get(url).await.map_err(|source| LoadError::Http {
                url: url.clone(),
                source,
            })?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status,
                });
            }
            response.text().await.map_err(|source| LoadError::Http {
                url: url.clone(),
                source,
            })
        }
    }
}

async fn read_file(path: &Path) -> Result<String, LoadError> {
    tracing::info!("Reading graph from {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Decode a document, choosing GEXF for `.gexf` sources or XML-looking text.
pub fn parse_document(text: &str, gexf_hint: bool) -> Result<RawDocument, LoadError> {
    if gexf_hint || text.trim_start().starts_with('<') {
        gexf::parse(text)
    } else {
        Ok(serde_json::from_str(text)?)
    }
}

/// Fetch, decode and validate a graph in one step.
pub async fn load(source: &DataSource) -> Result<(Graph, LoadReport), LoadError> {
    let text = fetch(source).await?;
    let raw = parse_document(&text, source.looks_like_gexf())?;
    Graph::from_document(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}/graph.json", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.org/net.json"),
            DataSource::Url("https://example.org/net.json".into())
        );
        assert_eq!(
            DataSource::parse("data/net.json"),
            DataSource::File(PathBuf::from("data/net.json"))
        );
        assert!(DataSource::parse("net.GEXF").looks_like_gexf());
    }

    #[test]
    fn test_parse_document_json() {
        let raw = parse_document(r#"{"nodes": [{"id": "A"}]}"#, false).unwrap();
        assert_eq!(raw.nodes.len(), 1);
        assert!(raw.edges.is_empty());
    }

    #[test]
    fn test_parse_document_invalid_json() {
        let err = parse_document(r#"{"edges": []}"#, false).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[tokio::test]
    async fn test_load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.json");
        fs::write(
            &path,
            r#"{"nodes": [{"id": "A", "label": "Alice"}, {"id": "B", "label": "Bob"}],
                "edges": [{"from": "A", "to": "B"}]}"#,
        )
        .unwrap();

        let (graph, report) = load(&DataSource::File(path)).await.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_load_gexf_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.gexf");
        fs::write(
            &path,
            r#"<gexf><graph><nodes><node id="a" label="Alice"/><node id="b" label="Bob"/></nodes>
               <edges><edge source="a" target="b"/></edges></graph></gexf>"#,
        )
        .unwrap();

        let (graph, _) = load(&DataSource::File(path)).await.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].from, "a");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load(&DataSource::File(dir.path().join("missing.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    // ─── HTTP ───

    #[tokio::test]
    async fn test_load_url() {
        let url = serve_once(http_response(
            "200 OK",
            r#"{"nodes": [{"id": "A"}, {"id": "B"}], "edges": [{"from": "A", "to": "B"}]}"#,
        ))
        .await;
        let (graph, _) = load(&DataSource::Url(url)).await.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let url = serve_once(http_response("404 Not Found", "")).await;
        let err = fetch(&DataSource::Url(url.clone())).await.unwrap_err();
        match err {
            LoadError::Status { url: failed, status } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(failed, url);
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetch(&DataSource::Url(format!("http://{}/graph.json", addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Http { .. }));
    }
}

//! Where the two sheet exports come from. The store only sees raw text;
//! HTTP, local files and in-memory fixtures all plug in through [`DataSource`].

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Published COMPDEC (municipal contacts) sheet export.
pub const DEFAULT_COMPDEC_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRZ25h1B9vD1IUmYVbD1-s4Adxg-BYtUojWfHbtT-1MtMCoT8oNMkelZgavVzJZFkP7c5Qj5Z9xmsn2/pub?gid=0&single=true&output=csv";
/// Published REPDEC (regional offices) sheet export.
pub const DEFAULT_REPDEC_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRZ25h1B9vD1IUmYVbD1-s4Adxg-BYtUojWfHbtT-1MtMCoT8oNMkelZgavVzJZFkP7c5Qj5Z9xmsn2/pub?gid=752420072&single=true&output=csv";

/// Raw text of both exports, retrieved together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDatasets {
    pub contacts: String,
    pub regionals: String,
}

#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Status { contacts: u16, regionals: u16 },
    Read { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "network error: {err}"),
            Self::Status {
                contacts,
                regionals,
            } => write!(
                f,
                "network error: COMPDEC status {contacts}, REPDEC status {regionals}"
            ),
            Self::Read { path, source } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::Status { .. } => None,
            Self::Read { source, .. } => Some(source),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Retrieve both exports. Either both succeed or the whole fetch fails.
    async fn fetch(&self) -> Result<RawDatasets, FetchError>;

    /// Short human-readable origin, shown in status output.
    fn describe(&self) -> String;
}

/// Fetches both published exports concurrently over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    compdec_url: String,
    repdec_url: String,
}

impl HttpSource {
    pub fn new(compdec_url: impl Into<String>, repdec_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            compdec_url: compdec_url.into(),
            repdec_url: repdec_url.into(),
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Ok(self.client.get(url).send().await?)
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_COMPDEC_URL, DEFAULT_REPDEC_URL)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self) -> Result<RawDatasets, FetchError> {
        let (contacts, regionals) =
            tokio::try_join!(self.get(&self.compdec_url), self.get(&self.repdec_url))?;

        if !contacts.status().is_success() || !regionals.status().is_success() {
            return Err(FetchError::Status {
                contacts: contacts.status().as_u16(),
                regionals: regionals.status().as_u16(),
            });
        }

        let (contacts, regionals) = tokio::try_join!(
            async { contacts.text().await.map_err(FetchError::from) },
            async { regionals.text().await.map_err(FetchError::from) },
        )?;
        Ok(RawDatasets {
            contacts,
            regionals,
        })
    }

    fn describe(&self) -> String {
        format!("http: {} | {}", self.compdec_url, self.repdec_url)
    }
}

/// Reads both exports from local files (e.g. a downloaded copy of the sheet).
#[derive(Debug, Clone)]
pub struct FileSource {
    contacts_path: PathBuf,
    regionals_path: PathBuf,
}

impl FileSource {
    pub fn new(contacts_path: impl Into<PathBuf>, regionals_path: impl Into<PathBuf>) -> Self {
        Self {
            contacts_path: contacts_path.into(),
            regionals_path: regionals_path.into(),
        }
    }
}

async fn read_text(path: &Path) -> Result<String, FetchError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self) -> Result<RawDatasets, FetchError> {
        let (contacts, regionals) = tokio::try_join!(
            read_text(&self.contacts_path),
            read_text(&self.regionals_path)
        )?;
        Ok(RawDatasets {
            contacts,
            regionals,
        })
    }

    fn describe(&self) -> String {
        format!(
            "files: {} | {}",
            self.contacts_path.display(),
            self.regionals_path.display()
        )
    }
}

/// In-memory exports; used by tests and for embedding fixed data.
#[derive(Debug, Clone)]
pub struct StaticSource {
    datasets: RawDatasets,
}

impl StaticSource {
    pub fn new(contacts: impl Into<String>, regionals: impl Into<String>) -> Self {
        Self {
            datasets: RawDatasets {
                contacts: contacts.into(),
                regionals: regionals.into(),
            },
        }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self) -> Result<RawDatasets, FetchError> {
        Ok(self.datasets.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Serve `connections` requests on a local port. Known paths answer 200
    /// with their body, everything else 404.
    fn serve_exports(routes: &'static [(&'static str, &'static str)], connections: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            for stream in listener.incoming().take(connections) {
                let Ok(mut stream) = stream else { continue };
                let mut request = Vec::new();
                let mut buf = [0_u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let response = match routes.iter().find(|(route, _)| *route == path) {
                    Some((_, body)) => format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    ),
                    None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string(),
                };
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn local_http_source(base: &str) -> HttpSource {
        HttpSource {
            client: reqwest::Client::builder()
                .no_proxy()
                .build()
                .expect("client builds"),
            compdec_url: format!("{base}/compdec"),
            repdec_url: format!("{base}/repdec"),
        }
    }

    #[tokio::test]
    async fn http_source_fetches_both_exports() {
        let base = serve_exports(
            &[
                ("/compdec", "Coordenador,Municipio\nAna,Gaspar\n"),
                ("/repdec", "REPDEC\nR1\n"),
            ],
            2,
        );
        let source = local_http_source(&base);
        let raw = source.fetch().await.expect("both exports served");
        assert_eq!(raw.contacts, "Coordenador,Municipio\nAna,Gaspar\n");
        assert_eq!(raw.regionals, "REPDEC\nR1\n");
    }

    #[tokio::test]
    async fn http_source_fails_when_one_export_is_missing() {
        let base = serve_exports(&[("/compdec", "Coordenador\nAna\n")], 2);
        let source = local_http_source(&base);
        let err = source.fetch().await.expect_err("missing REPDEC export must fail");
        assert!(matches!(
            err,
            FetchError::Status {
                contacts: 200,
                regionals: 404
            }
        ));
    }

    #[tokio::test]
    async fn static_source_returns_both_texts() {
        let source = StaticSource::new("A\n1", "B\n2");
        let raw = source.fetch().await.expect("static fetch");
        assert_eq!(raw.contacts, "A\n1");
        assert_eq!(raw.regionals, "B\n2");
    }

    #[tokio::test]
    async fn file_source_fails_when_either_file_is_missing() {
        let dir = std::env::temp_dir();
        let present = dir.join(format!("contatos-present-{}.csv", std::process::id()));
        std::fs::write(&present, "A\n1").expect("fixture should be written");
        let missing = dir.join("contatos-definitely-missing.csv");

        let source = FileSource::new(&present, &missing);
        let err = source.fetch().await.expect_err("missing file must fail");
        assert!(matches!(err, FetchError::Read { .. }));
        assert!(err.to_string().contains("contatos-definitely-missing.csv"));

        let _ = std::fs::remove_file(present);
    }

    #[test]
    fn status_error_names_both_statuses() {
        let err = FetchError::Status {
            contacts: 200,
            regionals: 404,
        };
        assert_eq!(
            err.to_string(),
            "network error: COMPDEC status 200, REPDEC status 404"
        );
    }
}

//! Raw text loading from a local file or an HTTP URL.
//!
//! Sources are immutable inputs: each pipeline run reads them once and works on
//! the returned text. Remote sources use the blocking `reqwest` client, so
//! async callers must run these on a blocking thread.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source file '{0}' does not exist")]
    Missing(PathBuf),
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to '{url}' failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to '{url}' failed with status {status}")]
    Status { url: String, status: u16 },
}

/// Where a table's raw text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Resolve a configured source string.
    ///
    /// `http://` / `https://` strings are URLs; anything else is a path,
    /// joined onto `base_dir` unless it is already absolute.
    pub fn resolve(location: &str, base_dir: &Path) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            return DataSource::Url(location.to_string());
        }
        let path = Path::new(location);
        if path.is_absolute() {
            DataSource::File(path.to_path_buf())
        } else {
            DataSource::File(base_dir.join(path))
        }
    }

    /// Read the full text of the source.
    pub fn read_text(&self) -> Result<String, SourceError> {
        match self {
            DataSource::File(path) => read_file(path),
            DataSource::Url(url) => fetch_url(url),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

fn read_file(path: &Path) -> Result<String, SourceError> {
    if !path.exists() {
        return Err(SourceError::Missing(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read source file");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn fetch_url(url: &str) -> Result<String, SourceError> {
    let fetch_err = |source| SourceError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(fetch_err)?;

    let resp = client.get(url).send().map_err(fetch_err)?;
    if !resp.status().is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    let text = resp.text().map_err(fetch_err)?;
    debug!(url, bytes = text.len(), "fetched source");
    Ok(text)
}

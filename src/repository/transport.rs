use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use log::trace;
use regex_lite::Regex;
use reqwest::{blocking::Client, StatusCode};
use thiserror::Error;

use crate::model::coordinate::join_url;

const METADATA_FILE_NAME: &str = "maven-metadata.xml";
const USER_AGENT: &str = concat!("artifetch/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// Moves files out of one remote repository.
pub trait Transport {
    /// Copies the repository-relative file `relative` to `destination`.
    /// Returns `false` when the remote does not have it.
    fn download(&self, relative: &Path, destination: &Path) -> Result<bool, TransportError>;

    /// Versions published under the repository-relative `artifact_path`.
    fn list_versions(&self, artifact_path: &Path) -> Result<Vec<String>, TransportError>;
}

/// A remote that is a plain directory.
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Transport for FileTransport {
    fn download(&self, relative: &Path, destination: &Path) -> Result<bool, TransportError> {
        let source = self.root.join(relative);
        if !source.is_file() {
            return Ok(false);
        }
        trace!("Copying {} to {}", source.display(), destination.display());
        std::fs::copy(&source, destination)?;
        Ok(true)
    }

    fn list_versions(&self, artifact_path: &Path) -> Result<Vec<String>, TransportError> {
        Ok(list_version_directories(&self.root.join(artifact_path))?)
    }
}

/// A remote served over http or https.
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

impl Transport for HttpTransport {
    fn download(&self, relative: &Path, destination: &Path) -> Result<bool, TransportError> {
        let url = join_url(&self.base_url, relative);
        trace!("GET {}", url);
        let mut response = self.client.get(&url).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => {
                let mut file = File::create(destination)?;
                response.copy_to(&mut file)?;
                file.flush()?;
                Ok(true)
            }
            status => Err(TransportError::Status {
                url,
                status: status.as_u16(),
            }),
        }
    }

    fn list_versions(&self, artifact_path: &Path) -> Result<Vec<String>, TransportError> {
        let url = join_url(&self.base_url, &artifact_path.join(METADATA_FILE_NAME));
        trace!("GET {}", url);
        let response = self.client.get(&url).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => Ok(parse_metadata_versions(&response.text()?)),
            status => Err(TransportError::Status {
                url,
                status: status.as_u16(),
            }),
        }
    }
}

/// Names of the subdirectories of `path`, or nothing if it does not exist.
pub fn list_version_directories(path: &Path) -> std::io::Result<Vec<String>> {
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut versions = Vec::new();
    for entry in path.read_dir()? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            versions.push(name);
        }
    }
    Ok(versions)
}

/// Extracts the `<version>` entries of a repository metadata document.
pub fn parse_metadata_versions(metadata: &str) -> Vec<String> {
    let re: Regex = Regex::new(r"<version>\s*([^<\s]+)\s*</version>").unwrap();
    let mut versions: Vec<String> = Vec::new();
    for captures in re.captures_iter(metadata) {
        let version = captures[1].to_owned();
        if !versions.contains(&version) {
            versions.push(version);
        }
    }
    versions
}

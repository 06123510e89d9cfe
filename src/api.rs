// API client module: a small blocking HTTP client that talks to the
// HackMyVM API and download host. One request per call, no retries, no
// custom timeouts.

use crate::catalog::{CatalogSource, MachineRecord};
use crate::error::{Error, Result};
use crate::ui;
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://hackmyvm.eu/apio/";
pub const DEFAULT_DOWNLOAD_URL: &str = "https://downloads.hackmyvm.eu";

/// Command token asking the API for the full machine listing.
const CATALOG_COMMAND: &str = "total";

/// Holds a reqwest blocking client plus the two base URLs it talks to.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    download_url: String,
}

impl ApiClient {
    /// Build a client from `HACKMYVM_API_URL` / `HACKMYVM_DOWNLOAD_URL`,
    /// falling back to the public endpoints.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("HACKMYVM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let download_url =
            std::env::var("HACKMYVM_DOWNLOAD_URL").unwrap_or_else(|_| DEFAULT_DOWNLOAD_URL.into());
        ApiClient::new(api_url, download_url)
    }

    pub fn new(api_url: impl Into<String>, download_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient::with_client(client, api_url, download_url))
    }

    pub fn with_client(
        client: Client,
        api_url: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        ApiClient {
            client,
            api_url: api_url.into(),
            download_url: download_url.into(),
        }
    }

    /// POST the form `k=<api key>&c=total` and parse the plaintext listing.
    /// The key is checked before anything touches the network.
    pub fn fetch_catalog(&self, api_key: Option<&str>) -> Result<Vec<MachineRecord>> {
        let api_key = match api_key {
            Some(k) if !k.is_empty() => k,
            _ => return Err(Error::ApiKeyMissing),
        };

        debug!(url = %self.api_url, "requesting machine catalog");
        let body = self
            .client
            .post(&self.api_url)
            .form(&[("k", api_key), ("c", CATALOG_COMMAND)])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(parse_catalog(&body))
    }

    /// `<download host>/<machine>.zip`
    pub fn archive_url(&self, machine: &str) -> String {
        format!("{}/{}.zip", self.download_url.trim_end_matches('/'), machine)
    }

    /// GET `url` (following redirects) and save the body in `dest_dir`
    /// under the last path segment of the final URL. The body goes to a
    /// temporary file first; `dest` only appears once it is complete.
    pub fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        debug!(url, "starting download");
        let response = self.client.get(url).send()?.error_for_status()?;

        let file_name = response
            .url()
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("download.zip")
            .to_string();
        let dest = dest_dir.join(&file_name);

        let progress = ui::download_progress(response.content_length(), &file_name);
        let mut reader = progress.wrap_read(response);
        let mut part = NamedTempFile::new_in(dest_dir)?;
        let copied = copy_body(&mut reader, part.as_file_mut());
        progress.finish_and_clear();
        let bytes = copied?;
        part.persist(&dest).map_err(|e| e.error)?;

        info!(path = %dest.display(), bytes, "download complete");
        Ok(dest)
    }
}

fn copy_body(reader: &mut impl Read, file: &mut File) -> std::io::Result<u64> {
    let mut writer = BufWriter::new(file);
    let bytes = std::io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

impl CatalogSource for ApiClient {
    fn fetch_catalog(&self, api_key: Option<&str>) -> Result<Vec<MachineRecord>> {
        ApiClient::fetch_catalog(self, api_key)
    }
}

/// One record per non-empty line, fields split on whitespace.
pub fn parse_catalog(body: &str) -> Vec<MachineRecord> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(MachineRecord::from_line)
        .collect()
}

//! Resumable byte transfer to local storage

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, RANGE};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Byte-level progress of one transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes on disk so far, including any resumed prefix
    pub bytes_written: u64,
    /// Total bytes expected (0 when the server did not say)
    pub bytes_expected: u64,
}

/// Transfer options
#[derive(Clone, Debug, Default)]
pub struct TransferOptions {
    /// Continue from a leftover partial file when possible
    pub resume: bool,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

/// What to fetch and where to put it
#[derive(Clone, Debug)]
pub struct TransferRequest {
    /// Remote resource
    pub source_url: String,
    /// Final local path
    pub destination: PathBuf,
    /// Transfer options
    pub options: TransferOptions,
}

/// A download primitive that streams to disk with progress callbacks
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Stream `request.source_url` into `request.destination`.
    ///
    /// `on_progress` may be called any number of times, in increasing byte
    /// order.
    ///
    /// # Returns
    ///
    /// `Ok(Some(path))` with the saved path, or `Ok(None)` when the transfer
    /// ended without producing a file.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or local I/O failure.
    async fn download(
        &self,
        request: &TransferRequest,
        on_progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> Result<Option<PathBuf>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Path of the in-progress file for `destination`
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// reqwest-backed transfer with `Range` resumption
///
/// Bytes land in `<destination>.part`, which is renamed into place once the
/// body has been fully written. A leftover partial file is continued with a
/// `Range: bytes=N-` request when resumption is enabled; a `200` answer
/// restarts from zero.
pub struct HttpTransfer {
    http_client: reqwest::Client,
}

impl HttpTransfer {
    /// Create a transfer client sharing the catalog's user agent.
    ///
    /// No overall timeout is set so large bodies are bounded only by the
    /// transport's defaults.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    async fn send(&self, request: &TransferRequest, offset: u64) -> Result<reqwest::Response> {
        let mut builder = self.http_client.get(&request.source_url);
        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if offset > 0 {
            debug!(offset, url = %request.source_url, "Resuming partial download");
            builder = builder.header(RANGE, format!("bytes={}-", offset));
        }
        Ok(builder.send().await?)
    }
}

/// Whether a response to `Range: bytes=<offset>-` can be used as-is.
///
/// A `206` must start exactly at `offset`. A `416` means the partial file no
/// longer matches the remote resource. Any other status is judged later.
fn resume_accepted(response: &reqwest::Response, offset: u64) -> bool {
    match response.status() {
        StatusCode::PARTIAL_CONTENT => content_range_start(response) == Some(offset),
        StatusCode::RANGE_NOT_SATISFIABLE => false,
        _ => true,
    }
}

/// First byte position of a `Content-Range: bytes <start>-<end>/<len>` header
fn content_range_start(response: &reqwest::Response) -> Option<u64> {
    let value = response.headers().get(CONTENT_RANGE)?.to_str().ok()?;
    let range = value.trim().strip_prefix("bytes ")?;
    let (start, _) = range.split_once('-')?;
    start.trim().parse().ok()
}

async fn remove_partial(part: &Path) -> Result<()> {
    match tokio::fs::remove_file(part).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn download(
        &self,
        request: &TransferRequest,
        on_progress: &(dyn Fn(TransferProgress) + Send + Sync),
    ) -> Result<Option<PathBuf>> {
        let destination = &request.destination;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let part = partial_path(destination);

        let mut offset = if request.options.resume {
            tokio::fs::metadata(&part)
                .await
                .map(|meta| meta.len())
                .unwrap_or(0)
        } else {
            0
        };

        let mut response = self.send(request, offset).await?;
        if offset > 0 && !resume_accepted(&response, offset) {
            warn!(
                status = response.status().as_u16(),
                offset,
                path = %part.display(),
                "Server refused to continue partial download, restarting from zero"
            );
            drop(response);
            remove_partial(&part).await?;
            offset = 0;
            response = self.send(request, 0).await?;
        }

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                url = %request.source_url,
                "Download returned no result"
            );
            return Ok(None);
        }

        let resumed = offset > 0 && status == StatusCode::PARTIAL_CONTENT;
        let (mut file, start) = if resumed {
            let file = tokio::fs::OpenOptions::new()
                .append(true)
                .open(&part)
                .await?;
            (file, offset)
        } else {
            (tokio::fs::File::create(&part).await?, 0)
        };

        let bytes_expected = response
            .content_length()
            .map(|len| len + start)
            .unwrap_or(0);
        let mut bytes_written = start;
        on_progress(TransferProgress {
            bytes_written,
            bytes_expected,
        });

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
            on_progress(TransferProgress {
                bytes_written,
                bytes_expected,
            });
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&part, destination).await?;
        info!(
            bytes = bytes_written,
            resumed,
            path = %destination.display(),
            "Transfer complete"
        );
        Ok(Some(destination.clone()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

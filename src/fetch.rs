//! Streaming HTTP download helpers
//!
//! Shared by the direct-download acquirers, the builder-tool fetch, and addon
//! provisioning. Response bodies are streamed straight to disk rather than
//! buffered in memory.

use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::AcquisitionError;

/// Stream the body of `url` into the file at `dest`
///
/// The destination file is created (or truncated) before the first byte is
/// written. On failure a partial file may be left behind; callers rely on the
/// status-drift check of the next run to force re-acquisition, so no cleanup
/// happens here.
///
/// # Errors
///
/// Returns an [`AcquisitionError`] on network failure, a non-success HTTP
/// status, an empty body, or a local write failure.
pub(crate) async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), AcquisitionError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AcquisitionError::BadResponse {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    if response.content_length() == Some(0) {
        return Err(AcquisitionError::EmptyBody {
            url: url.to_string(),
        });
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| AcquisitionError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AcquisitionError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
    }

    file.flush().await.map_err(|e| AcquisitionError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Derive a payload file name from the last path segment of a URL
///
/// Falls back to `"payload.jar"` when the URL has no usable segment.
#[must_use]
pub(crate) fn file_name_from_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url)
        && let Some(mut segments) = parsed.path_segments()
        && let Some(last) = segments.next_back()
        && !last.is_empty()
    {
        return last.to_string();
    }
    "payload.jar".to_string()
}

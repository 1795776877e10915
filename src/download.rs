//! File Downloader: streams a remote artifact to a temp path, verifies its digest,
//! then atomically renames it into place.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("writing {path} failed: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("downloaded {path} does not match expected digest (want {expected}, got {actual})")]
    Integrity { path: String, expected: String, actual: String },
}

/// Download `url` into `destination`, verifying its MD5 digest before publishing it.
///
/// On success, `destination` exists and hashes to `expected_md5`; no partial file is
/// ever observable there. On failure, `destination` is left unchanged; a `.tmp` file
/// may be left behind for the reconciler's candidate-stale sweep to collect later.
pub fn download_file(
    client: &reqwest::blocking::Client,
    url: &str,
    destination: &Path,
    expected_md5: &str,
) -> Result<(), DownloadError> {
    let tmp_path = tmp_path_for(destination);

    let response = client
        .get(url)
        .send()
        .map_err(|source| DownloadError::Request { url: url.to_string(), source })?;
    let mut response = response.error_for_status().map_err(|source| DownloadError::Status {
        url: url.to_string(),
        status: source.status().unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
    })?;

    let mut sink = File::create(&tmp_path).map_err(|source| DownloadError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;
    response
        .copy_to(&mut sink)
        .map_err(|source| DownloadError::Request { url: url.to_string(), source })?;
    sink.sync_all().map_err(|source| DownloadError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;
    drop(sink);

    let actual = md5_hex_of_file(&tmp_path).map_err(|source| DownloadError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;
    if !actual.eq_ignore_ascii_case(expected_md5) {
        return Err(DownloadError::Integrity {
            path: destination.display().to_string(),
            expected: expected_md5.to_string(),
            actual,
        });
    }

    fs::rename(&tmp_path, destination).map_err(|source| DownloadError::Io {
        path: destination.display().to_string(),
        source,
    })
}

pub fn tmp_path_for(destination: &Path) -> PathBuf {
    let mut os = destination.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn md5_hex_of_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut context = md5::Context::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        context.consume(&buf[..n]);
    }
    Ok(hex::encode(context.finalize().0))
}

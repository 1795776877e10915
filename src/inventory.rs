//! Inventory Fetcher: retrieves and parses the authoritative live-map list.

use std::collections::HashSet;

use serde::Deserialize;

/// One map in the authoritative list. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub spring_name: String,
    pub file_name: String,
    pub download_url: String,
    pub md5: String,
}

pub type Inventory = Vec<InventoryEntry>;

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "springName")]
    spring_name: String,
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(rename = "downloadURL")]
    download_url: String,
    md5: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("failed to decode inventory from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("inventory entry `{0}` appears more than once")]
    DuplicateFileName(String),
}

/// Fetch and decode the inventory document. No retries at this layer; retry is
/// implicit in the next trigger.
pub fn fetch_inventory(client: &reqwest::blocking::Client, url: &str) -> Result<Inventory, FetchError> {
    let response = client
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

    let response = response.error_for_status().map_err(|source| FetchError::Status {
        url: url.to_string(),
        status: source.status().unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
    })?;

    let raw: Vec<RawEntry> = response
        .json()
        .map_err(|source| FetchError::Decode { url: url.to_string(), source })?;

    let mut seen = HashSet::with_capacity(raw.len());
    let mut inventory = Vec::with_capacity(raw.len());
    for entry in raw {
        if !seen.insert(entry.file_name.clone()) {
            return Err(FetchError::DuplicateFileName(entry.file_name));
        }
        inventory.push(InventoryEntry {
            spring_name: entry.spring_name,
            file_name: entry.file_name,
            download_url: entry.download_url,
            md5: entry.md5,
        });
    }
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_array_ignoring_unknown_fields() {
        let raw = r#"[
            {"springName": "Comet Catcher", "fileName": "comet_catcher.sd7",
             "downloadURL": "https://example.test/comet_catcher.sd7",
             "md5": "deadbeef", "extra": "ignored"}
        ]"#;
        let parsed: Vec<RawEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].file_name, "comet_catcher.sd7");
    }

    #[test]
    fn rejects_missing_required_field() {
        let raw = r#"[{"springName": "x", "fileName": "x.sd7", "md5": "abc"}]"#;
        let parsed: Result<Vec<RawEntry>, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }
}

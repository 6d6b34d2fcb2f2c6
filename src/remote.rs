//! Remote asset collaborator: a listing of importable meshes and the byte
//! fetch that feeds URL import. Blocking I/O by design — the engine runs on
//! a single logical thread and the host drives these from its event loop.

use crate::error::EditError;
use serde::Deserialize;
use std::io::Read;

/// One importable asset as the catalog endpoint describes it. The
/// `model_url` string is the mesh reference handed to URL import (and the
/// payload of a drag-and-drop gesture).
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAsset {
    pub file_id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub model_url: String,
}

#[derive(Debug, Deserialize)]
struct AssetListing {
    assets: Vec<RemoteAsset>,
}

/// Fetch the asset catalog from `<base_url>/assets`.
pub fn fetch_catalog(base_url: &str) -> Result<Vec<RemoteAsset>, EditError> {
    let url = format!("{}/assets", base_url.trim_end_matches('/'));
    let response = ureq::get(&url).call().map_err(|err| EditError::network(&url, err))?;
    let listing: AssetListing = response.into_json().map_err(|err| EditError::network(&url, err))?;
    log::info!("[remote] fetched {} assets from {url}", listing.assets.len());
    Ok(listing.assets)
}

/// Download a resource, reporting received percentage through `progress`.
///
/// Percentage is 0–100 when the server sends a length, otherwise the
/// callback only fires once at completion.
pub fn fetch_bytes(url: &str, mut progress: impl FnMut(f32)) -> Result<Vec<u8>, EditError> {
    let response = ureq::get(url).call().map_err(|err| EditError::network(url, err))?;
    let total: Option<u64> =
        response.header("Content-Length").and_then(|value| value.parse().ok()).filter(|len| *len > 0);

    let mut reader = response.into_reader();
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk).map_err(|err| EditError::network(url, err))?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        if let Some(total) = total {
            progress((bytes.len() as f32 / total as f32) * 100.0);
        }
    }
    progress(100.0);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_envelope_parses() {
        let payload = r#"{"assets": [{
            "file_id": "a1",
            "name": "Armchair",
            "thumbnail_url": "https://cdn.example/thumbs/a1.png",
            "model_url": "https://cdn.example/models/a1.glb"
        }]}"#;
        let listing: AssetListing = serde_json::from_str(payload).unwrap();
        assert_eq!(listing.assets.len(), 1);
        assert_eq!(listing.assets[0].name, "Armchair");
        assert_eq!(listing.assets[0].model_url, "https://cdn.example/models/a1.glb");
    }

    #[test]
    fn listing_tolerates_missing_thumbnail() {
        let payload = r#"{"assets": [{"file_id": "b2", "name": "Stool", "model_url": "u"}]}"#;
        let listing: AssetListing = serde_json::from_str(payload).unwrap();
        assert!(listing.assets[0].thumbnail_url.is_none());
    }
}

pub mod media;
pub mod people;
pub mod recognize;
pub mod storage;

use crate::collaborators::UrlSigner;
use tracing::warn;

/// Presign `key` for the client, logging instead of failing when signing doesn't work.
pub(crate) fn presigned_url(signer: &UrlSigner, key: Option<&str>) -> Option<String> {
    let key = key?;
    match signer.presign(key) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Could not presign {key}: {e}");
            None
        }
    }
}

/// `None` for missing or blank strings, otherwise the trimmed value.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

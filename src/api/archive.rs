//! HTTP client for the Internet Archive search and metadata APIs.
//!
//! The live playlist is one popularity-sorted search page, resolved item by
//! item in result order. Metadata lookups run strictly sequentially; a
//! failing item is logged and skipped by [`model::collect_tracks`] so one
//! bad record never costs the whole playlist.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::model::{self, ItemMetadata, SearchDoc, SearchResponse};
use crate::playlist::Playlist;

static SEARCH_URL: &str = "https://archive.org/advancedsearch.php";
static METADATA_BASE: &str = "https://archive.org/metadata/";

/// One collection, audio items only, with derived VBR MP3s present.
static SEARCH_QUERY: &str =
    "collection:(georgeblood) AND mediatype:(audio) AND format:(VBR MP3)";
/// The archive's own popularity signal.
static SEARCH_SORT: &str = "downloads desc";
static SEARCH_FIELDS: [&str; 4] = ["identifier", "title", "creator", "date"];
/// One page of results feeds the whole playlist.
const PAGE_SIZE: u32 = 15;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
static USER_AGENT: &str = concat!("shellac/", env!("CARGO_PKG_VERSION"));

/// Why the live playlist could not be built.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or HTTP-status failure on a search or metadata call.
    #[error("archive request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Body was not the JSON shape the endpoint documents.
    #[error("malformed archive response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// The search matched nothing.
    #[error("search returned no results")]
    NoResults,
    /// Every hit was dropped during per-item resolution.
    #[error("no playable tracks in the search results")]
    EmptyPlaylist,
}

pub struct ArchiveClient {
    client: Client,
}

impl ArchiveClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Build the live playlist: search once, then resolve each hit.
    pub async fn fetch_playlist(&self) -> Result<Playlist, FetchError> {
        let docs = self.search_items().await?;
        tracing::info!("Search returned {} items", docs.len());
        if docs.is_empty() {
            return Err(FetchError::NoResults);
        }

        let mut resolved = Vec::with_capacity(docs.len());
        for doc in docs {
            let outcome = self.item_metadata(&doc.identifier).await;
            resolved.push((doc, outcome));
        }

        let tracks = model::collect_tracks(resolved);
        tracing::info!("Resolved {} playable tracks", tracks.len());
        Playlist::from_tracks(tracks).ok_or(FetchError::EmptyPlaylist)
    }

    /// One page of search hits, popularity-sorted.
    async fn search_items(&self) -> Result<Vec<SearchDoc>, FetchError> {
        let body = self
            .client
            .get(SEARCH_URL)
            .query(&search_params())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.response.docs)
    }

    /// Full metadata record for one item.
    async fn item_metadata(&self, identifier: &str) -> Result<ItemMetadata, FetchError> {
        let url = format!("{}{}", METADATA_BASE, identifier);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Query string for the search page. `fl[]` repeats once per projected field.
fn search_params() -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", SEARCH_QUERY.to_string()),
        ("sort[]", SEARCH_SORT.to_string()),
        ("rows", PAGE_SIZE.to_string()),
        ("page", "1".to_string()),
        ("output", "json".to_string()),
    ];
    for field in SEARCH_FIELDS {
        params.push(("fl[]", field.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_project_every_field() {
        let params = search_params();
        let fields: Vec<&str> = params
            .iter()
            .filter(|(key, _)| *key == "fl[]")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(fields, ["identifier", "title", "creator", "date"]);
    }

    #[test]
    fn search_params_request_one_json_page() {
        let params = search_params();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("output"), Some("json"));
        assert_eq!(get("page"), Some("1"));
        assert_eq!(get("rows"), Some("15"));
        assert_eq!(get("sort[]"), Some("downloads desc"));
    }
}

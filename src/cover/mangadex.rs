//! MangaDex cover art lookup.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{CoverError, CoverProvider, VolumeCover};
use crate::domain::CatalogConfig;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Listing<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MangaEntry {
    id: String,
    attributes: MangaAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MangaAttributes {
    #[serde(default)]
    title: HashMap<String, String>,
    #[serde(default)]
    alt_titles: Vec<HashMap<String, String>>,
}

impl MangaEntry {
    fn titles(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .title
            .values()
            .chain(self.attributes.alt_titles.iter().flat_map(|m| m.values()))
            .map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoverEntry {
    attributes: CoverAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoverAttributes {
    volume: Option<String>,
    file_name: String,
}

pub struct MangaDexClient {
    client: Client,
    api_base: String,
    uploads_base: String,
}

impl MangaDexClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CoverError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            uploads_base: config.uploads_base.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CoverError> {
        tracing::debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoverError::Status { url: url.to_string(), status: status.as_u16() });
        }
        Ok(response.json()?)
    }

    fn find_manga_id(&self, title: &str) -> Result<String, CoverError> {
        let url = format!("{}/manga", self.api_base);
        let listing: Listing<MangaEntry> =
            self.get_json(&url, &[("title", title), ("limit", "10")])?;
        pick_manga(title, &listing.data)
            .map(|entry| entry.id.clone())
            .ok_or_else(|| CoverError::NoMatch(title.to_string()))
    }
}

impl CoverProvider for MangaDexClient {
    fn volume_covers(&self, title: &str) -> Result<Vec<VolumeCover>, CoverError> {
        let manga_id = self.find_manga_id(title)?;
        tracing::info!("Matched '{}' to MangaDex id {}", title, manga_id);

        let url = format!("{}/cover", self.api_base);
        let listing: Listing<CoverEntry> = self.get_json(
            &url,
            &[("manga[]", manga_id.as_str()), ("limit", "100"), ("order[volume]", "asc")],
        )?;

        Ok(listing
            .data
            .into_iter()
            .map(|entry| VolumeCover {
                volume: entry.attributes.volume,
                url: format!(
                    "{}/covers/{}/{}",
                    self.uploads_base, manga_id, entry.attributes.file_name
                ),
                file_name: entry.attributes.file_name,
            })
            .collect())
    }

    fn download(&self, cover: &VolumeCover) -> Result<Vec<u8>, CoverError> {
        tracing::debug!("Downloading cover {}", cover.url);
        let response = self.client.get(&cover.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoverError::Status { url: cover.url.clone(), status: status.as_u16() });
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Prefer an exact (normalized) title match, otherwise the first search hit.
pub(crate) fn pick_manga<'a>(title: &str, entries: &'a [MangaEntry]) -> Option<&'a MangaEntry> {
    let wanted = normalize(title);
    entries
        .iter()
        .find(|entry| entry.titles().any(|t| normalize(t) == wanted))
        .or_else(|| entries.first())
}

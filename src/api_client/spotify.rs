//! A small client for the parts of the Spotify Web API needed to build catalogs.
//!
//! Authentication uses the client credentials flow, which is enough to search
//! and read public album listings.

use crate::api_client::SpotifyError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE_URL: &str = "https://api.spotify.com/v1";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpotifyAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// One page of a paginated listing; `next` is the URL of the following page.
#[derive(Debug, Deserialize, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchResults {
    #[serde(default)]
    pub artists: Page<SpotifyArtist>,
    #[serde(default)]
    pub albums: Page<SpotifyAlbum>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Where catalog data comes from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Searches artists and albums matching `query`, a handful of each.
    async fn search(&self, query: &str) -> Result<SearchResults, SpotifyError>;

    /// Every album and single of an artist, all pages followed.
    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<SpotifyAlbum>, SpotifyError>;
}

pub struct SpotifyClient {
    client: Client,
    token: String,
}

impl SpotifyClient {
    /// Exchanges the application credentials for an access token.
    pub async fn authenticate(client_id: &str, client_secret: &str) -> Result<Self, SpotifyError> {
        let client = Client::new();

        let response = client
            .post(ACCOUNTS_URL)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = check_status(response).await?.json().await?;
        debug!("spotify access token obtained");

        Ok(Self {
            client,
            token: token.access_token,
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, SpotifyError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        check_status(response).await
    }
}

#[async_trait]
impl CatalogSource for SpotifyClient {
    async fn search(&self, query: &str) -> Result<SearchResults, SpotifyError> {
        let url = format!("{API_BASE_URL}/search");
        let response = self
            .get(&url, &[("q", query), ("type", "artist,album"), ("limit", "5")])
            .await?;
        Ok(response.json().await?)
    }

    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<SpotifyAlbum>, SpotifyError> {
        let first = format!("{API_BASE_URL}/artists/{artist_id}/albums");
        let mut page: Page<SpotifyAlbum> = self
            .get(&first, &[("include_groups", "album,single"), ("limit", "50")])
            .await?
            .json()
            .await?;

        let mut albums = std::mem::take(&mut page.items);
        while let Some(next) = page.next.take() {
            debug!(url = %next, "fetching next album page");
            page = self.get(&next, &[]).await?.json().await?;
            albums.append(&mut page.items);
        }

        Ok(albums)
    }
}

async fn check_status(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body["error"]["message"]
        .as_str()
        .or_else(|| body["error_description"].as_str())
        .or_else(|| body["error"].as_str())
        .unwrap_or("Unknown error")
        .to_string();

    Err(SpotifyError::ApiError { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_results_deserialize() {
        let body = r#"{
            "artists": { "items": [ { "id": "1", "name": "Elis Regina", "genres": [] } ], "next": null },
            "albums": { "items": [ {
                "id": "a1",
                "name": "Elis & Tom",
                "artists": [ { "id": "1", "name": "Elis Regina" } ],
                "external_urls": { "spotify": "https://open.spotify.com/album/a1" }
            } ] }
        }"#;

        let results: SearchResults = serde_json::from_str(body).unwrap();

        assert_eq!(results.artists.items[0].name, "Elis Regina");
        assert_eq!(
            results.albums.items[0].external_urls.spotify.as_deref(),
            Some("https://open.spotify.com/album/a1")
        );
    }

    #[test]
    fn test_search_results_tolerate_missing_sections() {
        let results: SearchResults = serde_json::from_str(r#"{ "albums": { "items": [] } }"#).unwrap();
        assert!(results.artists.items.is_empty());
        assert!(results.albums.items.is_empty());
    }

    #[test]
    fn test_album_page_with_next() {
        let body = r#"{ "items": [ { "id": "a", "name": "A" } ], "next": "https://api.spotify.com/v1/artists/1/albums?offset=50" }"#;
        let page: Page<SpotifyAlbum> = serde_json::from_str(body).unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].external_urls.spotify.is_none());
        assert!(page.next.is_some());
    }
}

use serde::{Deserialize, Serialize};

/// One artist and the albums to download for it.
///
/// Field names on disk are fixed by the existing catalog files and must not change.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Catalog {
    #[serde(rename = "id_artista", default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(rename = "nome_artista")]
    pub artist_name: String,
    #[serde(rename = "albuns", default)]
    pub albums: Vec<Album>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Album {
    #[serde(rename = "id_album", default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(rename = "nome_album")]
    pub name: String,
    #[serde(rename = "url_album", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Album {
    /// The download URL, treating an empty or blank string the same as a missing one.
    pub fn url(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

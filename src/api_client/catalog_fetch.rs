use crate::api_client::{CatalogSource, SpotifyAlbum, SpotifyError};
use crate::foundation::catalog::{Album, Catalog};
use std::collections::HashMap;

/// Builds a catalog for the artist best matching `query`.
///
/// The first artist hit wins. When the search finds albums but no artist, the
/// first artist of the first album is used instead.
///
/// # Example
///
/// ```no_run
/// use albumfetch::{fetch_catalog, SpotifyClient};
///
/// async fn example() {
///     let client = SpotifyClient::authenticate("id", "secret").await.unwrap();
///     let catalog = fetch_catalog(&client, "Gal Costa").await.unwrap();
///     println!("{} albums", catalog.albums.len());
/// }
/// ```
pub async fn fetch_catalog(
    source: &dyn CatalogSource,
    query: &str,
) -> Result<Catalog, SpotifyError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SpotifyError::EmptyQuery);
    }

    let results = source.search(query).await?;

    let artist = results
        .artists
        .items
        .into_iter()
        .next()
        .or_else(|| {
            results
                .albums
                .items
                .into_iter()
                .next()
                .and_then(|album| album.artists.into_iter().next())
        })
        .ok_or_else(|| SpotifyError::NoResults(query.to_string()))?;

    let albums = dedupe_by_name(source.artist_albums(&artist.id).await?);

    Ok(Catalog {
        artist_id: Some(artist.id),
        artist_name: artist.name,
        albums: albums
            .into_iter()
            .map(|album| Album {
                album_id: Some(album.id),
                name: album.name,
                source_url: album.external_urls.spotify,
            })
            .collect(),
    })
}

/// Keeps one album per name: at the position of its first occurrence, with the
/// data of its last one.
fn dedupe_by_name(albums: Vec<SpotifyAlbum>) -> Vec<SpotifyAlbum> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<SpotifyAlbum> = Vec::new();

    for album in albums {
        match positions.get(&album.name) {
            Some(&index) => unique[index] = album,
            None => {
                positions.insert(album.name.clone(), unique.len());
                unique.push(album);
            }
        }
    }

    unique
}

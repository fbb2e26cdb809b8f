//! Construction des objets selon leur type et recherches de playlists

use std::sync::Arc;

use tracing::debug;

use crate::error::{PlexError, Result};
use crate::media::MediaItem;
use crate::object::PlexObject;
use crate::playlist::Playlist;
use crate::record::RawRecord;
use crate::server::PlexServer;

/// Objet construit depuis une liste renvoyée par le serveur
#[derive(Debug, Clone)]
pub enum LibraryItem {
    Playlist(Playlist),
    Media(MediaItem),
}

impl LibraryItem {
    pub fn as_playlist(&self) -> Option<&Playlist> {
        match self {
            LibraryItem::Playlist(p) => Some(p),
            LibraryItem::Media(_) => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaItem> {
        match self {
            LibraryItem::Media(m) => Some(m),
            LibraryItem::Playlist(_) => None,
        }
    }
}

/// Construit l'objet correspondant à l'attribut `type` de l'enregistrement
pub fn build_item(server: Arc<dyn PlexServer>, record: &RawRecord, initpath: &str) -> LibraryItem {
    match record.get("type") {
        Some(t) if t == Playlist::TYPE => {
            LibraryItem::Playlist(Playlist::build(server, record, initpath))
        }
        other => {
            debug!("Building media item for type {:?}", other);
            LibraryItem::Media(MediaItem::build(server, record, initpath))
        }
    }
}

/// Récupère et construit tous les objets listés par `path`
pub fn list_items(server: Arc<dyn PlexServer>, path: &str) -> Result<Vec<LibraryItem>> {
    let records = server.fetch_many(path)?;
    Ok(records
        .iter()
        .map(|record| build_item(server.clone(), record, path))
        .collect())
}

/// Toutes les playlists du serveur
pub fn playlists(server: Arc<dyn PlexServer>) -> Result<Vec<Playlist>> {
    Ok(list_items(server, "/playlists")?
        .into_iter()
        .filter_map(|item| match item {
            LibraryItem::Playlist(p) => Some(p),
            LibraryItem::Media(_) => None,
        })
        .collect())
}

/// Première playlist dont le titre est exactement `title`
pub fn playlist(server: Arc<dyn PlexServer>, title: &str) -> Result<Playlist> {
    playlists(server)?
        .into_iter()
        .find(|p| p.title.as_deref() == Some(title))
        .ok_or_else(|| PlexError::NotFound(format!("playlist {:?}", title)))
}

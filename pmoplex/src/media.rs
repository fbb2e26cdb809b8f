//! Médias pouvant être placés dans une playlist

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{PlexError, Result};
use crate::object::{Field, Hydrated, PlexObject, Schema};
use crate::server::PlexServer;

/// Catégorie de média (`video`, `audio`, `photo`) ; deux catégories
/// différentes ne peuvent pas cohabiter dans une playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KindTag(String);

impl KindTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Catégorie correspondant à un attribut `type` du serveur
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type {
            "movie" | "show" | "season" | "episode" | "clip" | "video" => Self::new("video"),
            "track" | "album" | "artist" | "audio" => Self::new("audio"),
            "photo" | "photoalbum" => Self::new("photo"),
            other => Self::new(other),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KindTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Élément pouvant être ajouté à une playlist
pub trait PlaylistItem {
    /// Catégorie de l'élément, comparée à celle de la playlist
    fn kind(&self) -> KindTag;

    /// Identifiant de l'élément sur le serveur
    fn rating_key(&self) -> Option<u64>;

    /// Identifiant attribué par le serveur lors de l'ajout à une playlist
    fn playlist_item_id(&self) -> Option<u64>;

    /// UUID de la section de bibliothèque contenant l'élément
    fn section_uuid(&self, server: &dyn PlexServer) -> Result<String>;
}

/// Média de bibliothèque (film, épisode, piste, photo)
#[derive(Clone)]
pub struct MediaItem {
    server: Arc<dyn PlexServer>,
    pub initpath: String,
    pub rating_key: Option<u64>,
    pub key: Option<String>,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    /// Durée en millisecondes
    pub duration: Option<i64>,
    pub library_section_id: Option<u64>,
    pub library_section_uuid: Option<String>,
    pub playlist_item_id: Option<u64>,
    pub session_key: Option<i64>,
    pub index: Option<i64>,
    pub parent_title: Option<String>,
    pub grandparent_title: Option<String>,
    pub year: Option<i64>,
}

const MEDIA_SCHEMA: Schema = &[
    Field::int("ratingKey"),
    Field::string("key"),
    Field::string("type"),
    Field::string("title"),
    Field::string("summary"),
    Field::timestamp("addedAt"),
    Field::timestamp("updatedAt"),
    Field::timestamp("viewedAt"),
    Field::int("duration"),
    Field::int("librarySectionID"),
    Field::string("librarySectionUUID"),
    Field::int("playlistItemID"),
    Field::int("sessionKey"),
    Field::int("index"),
    Field::string("parentTitle"),
    Field::string("grandparentTitle"),
    Field::int("year"),
];

impl PlexObject for MediaItem {
    const TYPE: &'static str = "media";
    const SCHEMA: Schema = MEDIA_SCHEMA;

    fn from_hydrated(server: Arc<dyn PlexServer>, initpath: String, attrs: Hydrated) -> Self {
        Self {
            server,
            initpath,
            rating_key: attrs.uint("ratingKey"),
            key: attrs.string("key"),
            media_type: attrs.string("type"),
            title: attrs.string("title"),
            summary: attrs.string("summary"),
            added_at: attrs.timestamp("addedAt"),
            updated_at: attrs.timestamp("updatedAt"),
            viewed_at: attrs.timestamp("viewedAt"),
            duration: attrs.int("duration"),
            library_section_id: attrs.uint("librarySectionID"),
            library_section_uuid: attrs.string("librarySectionUUID"),
            playlist_item_id: attrs.uint("playlistItemID"),
            session_key: attrs.int("sessionKey"),
            index: attrs.int("index"),
            parent_title: attrs.string("parentTitle"),
            grandparent_title: attrs.string("grandparentTitle"),
            year: attrs.int("year"),
        }
    }
}

impl MediaItem {
    pub fn server(&self) -> &Arc<dyn PlexServer> {
        &self.server
    }
}

impl fmt::Debug for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaItem")
            .field("rating_key", &self.rating_key)
            .field("media_type", &self.media_type)
            .field("title", &self.title)
            .field("playlist_item_id", &self.playlist_item_id)
            .finish_non_exhaustive()
    }
}

impl PlaylistItem for MediaItem {
    fn kind(&self) -> KindTag {
        self.media_type
            .as_deref()
            .map(KindTag::from_media_type)
            .unwrap_or_default()
    }

    fn rating_key(&self) -> Option<u64> {
        self.rating_key
    }

    fn playlist_item_id(&self) -> Option<u64> {
        self.playlist_item_id
    }

    fn section_uuid(&self, server: &dyn PlexServer) -> Result<String> {
        if let Some(uuid) = &self.library_section_uuid {
            return Ok(uuid.clone());
        }

        let section_id = self
            .library_section_id
            .ok_or(PlexError::MissingAttribute("librarySectionID"))?;
        debug!("Looking up uuid of library section {}", section_id);

        let wanted = section_id.to_string();
        server
            .fetch_many("/library/sections")?
            .iter()
            .find(|section| section.get("key") == Some(wanted.as_str()))
            .and_then(|section| section.get("uuid"))
            .map(str::to_string)
            .ok_or_else(|| PlexError::NotFound(format!("library section {}", section_id)))
    }
}

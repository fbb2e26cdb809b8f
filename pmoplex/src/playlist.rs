//! Playlists du serveur Plex
//!
//! Un [`Playlist`] est une projection locale d'une playlist distante. Les
//! opérations de modification agissent sur le serveur uniquement : pour voir
//! le résultat il faut récupérer une nouvelle projection ([`Playlist::reload`]).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{PlexError, Result};
use crate::hydrate::Attr;
use crate::media::{KindTag, MediaItem, PlaylistItem};
use crate::object::{Field, Hydrated, PlexObject, Schema};
use crate::query::join_args;
use crate::record::MediaContainer;
use crate::server::{Method, PlexServer};

/// Le serveur renvoie parfois la clé de la playlist suffixée par `/items`
fn strip_items_suffix(attr: Attr) -> Attr {
    match attr {
        Attr::Str(key) => match key.strip_suffix("/items") {
            Some("") => Attr::Absent,
            Some(stripped) => Attr::Str(stripped.to_string()),
            None => Attr::Str(key),
        },
        other => other,
    }
}

const PLAYLIST_SCHEMA: Schema = &[
    Field::timestamp("addedAt"),
    Field::string("composite"),
    Field::int("duration"),
    Field::int("durationInSeconds"),
    Field::string("guid"),
    Field::string("key").then(strip_items_suffix),
    Field::int("leafCount"),
    Field::string("playlistType"),
    Field::int("ratingKey"),
    Field::flag("smart"),
    Field::string("summary"),
    Field::string("title"),
    Field::string("type"),
    Field::timestamp("updatedAt"),
    Field::int("sessionKey"),
    Field::timestamp("viewedAt"),
    Field::int("playlistItemID"),
];

/// Playlist Plex
#[derive(Clone)]
pub struct Playlist {
    server: Arc<dyn PlexServer>,
    /// Chemin de la requête ayant produit cet objet
    pub initpath: String,
    pub added_at: Option<DateTime<Utc>>,
    /// URL de la vignette composite
    pub composite: Option<String>,
    /// Durée en millisecondes
    pub duration: Option<i64>,
    pub duration_in_seconds: Option<i64>,
    pub guid: Option<String>,
    /// Chemin de la playlist, base de toutes les requêtes la concernant
    pub key: Option<String>,
    pub leaf_count: Option<i64>,
    pub playlist_type: Option<String>,
    pub rating_key: Option<u64>,
    pub smart: Option<bool>,
    pub summary: Option<String>,
    pub title: Option<String>,
    pub object_type: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub session_key: Option<i64>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub playlist_item_id: Option<u64>,
}

impl PlexObject for Playlist {
    const TYPE: &'static str = "playlist";
    const SCHEMA: Schema = PLAYLIST_SCHEMA;

    fn from_hydrated(server: Arc<dyn PlexServer>, initpath: String, attrs: Hydrated) -> Self {
        Self {
            server,
            initpath,
            added_at: attrs.timestamp("addedAt"),
            composite: attrs.string("composite"),
            duration: attrs.int("duration"),
            duration_in_seconds: attrs.int("durationInSeconds"),
            guid: attrs.string("guid"),
            key: attrs.string("key"),
            leaf_count: attrs.int("leafCount"),
            playlist_type: attrs.string("playlistType"),
            rating_key: attrs.uint("ratingKey"),
            smart: attrs.bool("smart"),
            summary: attrs.string("summary"),
            title: attrs.string("title"),
            object_type: attrs.string("type"),
            updated_at: attrs.timestamp("updatedAt"),
            session_key: attrs.int("sessionKey"),
            viewed_at: attrs.timestamp("viewedAt"),
            playlist_item_id: attrs.uint("playlistItemID"),
        }
    }
}

/// Modifications des métadonnées d'une playlist.
///
/// Seuls les champs renseignés sont envoyés au serveur.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistEdit {
    pub title: Option<String>,
    pub summary: Option<String>,
}

impl PlaylistEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Identifiants des éléments d'un lot, joints par des virgules, et UUID de
/// la section du premier élément
fn batch_uri(server: &dyn PlexServer, items: &[&dyn PlaylistItem]) -> Result<String> {
    let first = items.first().ok_or(PlexError::EmptyBatch)?;

    let rating_keys = items
        .iter()
        .map(|item| {
            item.rating_key()
                .map(|key| key.to_string())
                .ok_or(PlexError::MissingAttribute("ratingKey"))
        })
        .collect::<Result<Vec<_>>>()?
        .join(",");

    let uuid = first.section_uuid(server)?;
    Ok(format!(
        "library://{}/directory//library/metadata/{}",
        uuid, rating_keys
    ))
}

impl Playlist {
    pub fn server(&self) -> &Arc<dyn PlexServer> {
        &self.server
    }

    /// Catégorie de la playlist (`video`, `audio` ou `photo`)
    pub fn kind(&self) -> KindTag {
        KindTag::new(self.playlist_type.clone().unwrap_or_default())
    }

    fn require_key(&self) -> Result<&str> {
        self.key
            .as_deref()
            .ok_or(PlexError::MissingAttribute("key"))
    }

    fn item_id(item: &dyn PlaylistItem) -> Result<u64> {
        item.playlist_item_id()
            .ok_or(PlexError::MissingAttribute("playlistItemID"))
    }

    /// Récupère la playlist identifiée par `rating_key`
    pub fn fetch(server: Arc<dyn PlexServer>, rating_key: u64) -> Result<Self> {
        let path = format!("/playlists/{}", rating_key);
        let record = server.fetch(&path)?;
        Ok(Self::build(server, &record, &path))
    }

    /// Nouvelle projection de la playlist, relue depuis le serveur
    pub fn reload(&self) -> Result<Self> {
        let key = self.require_key()?;
        let record = self.server.fetch(key)?;
        Ok(Self::build(self.server.clone(), &record, key))
    }

    /// Éléments de la playlist.
    ///
    /// La liste est récupérée à chaque appel ; les objets sont construits au
    /// fil de l'itération.
    pub fn items(&self) -> Result<impl Iterator<Item = MediaItem> + use<>> {
        let path = format!("{}/items", self.require_key()?);
        debug!("Fetching items of playlist {}", path);

        let records = self.server.fetch_many(&path)?;
        let server = self.server.clone();
        Ok(records
            .into_iter()
            .map(move |record| MediaItem::build(server.clone(), &record, &path)))
    }

    /// Ajoute un élément à la playlist
    pub fn add_item(&self, item: &dyn PlaylistItem) -> Result<MediaContainer> {
        self.add_items(&[item])
    }

    /// Ajoute des éléments à la playlist en une seule requête.
    ///
    /// Tous les éléments doivent être de la catégorie de la playlist ; la
    /// vérification est faite avant tout envoi.
    pub fn add_items(&self, items: &[&dyn PlaylistItem]) -> Result<MediaContainer> {
        let key = self.require_key()?;
        if items.is_empty() {
            return Err(PlexError::EmptyBatch);
        }

        let expected = self.kind();
        for item in items {
            let found = item.kind();
            if found != expected {
                return Err(PlexError::MixedKinds { expected, found });
            }
        }

        let uri = batch_uri(self.server.as_ref(), items)?;
        let path = format!("{}/items{}", key, join_args(&[("uri", Some(uri))]));
        debug!("Adding {} items to playlist {}", items.len(), key);
        self.server.submit(&path, Method::Put)
    }

    /// Retire un élément de la playlist
    pub fn remove_item(&self, item: &dyn PlaylistItem) -> Result<MediaContainer> {
        let path = format!("{}/items/{}", self.require_key()?, Self::item_id(item)?);
        self.server.submit(&path, Method::Delete)
    }

    /// Déplace un élément après `after`, ou en tête de playlist sans `after`
    pub fn move_item(
        &self,
        item: &dyn PlaylistItem,
        after: Option<&dyn PlaylistItem>,
    ) -> Result<MediaContainer> {
        let mut path = format!(
            "{}/items/{}/move",
            self.require_key()?,
            Self::item_id(item)?
        );
        if let Some(after) = after {
            path.push_str(&format!("?after={}", Self::item_id(after)?));
        }
        self.server.submit(&path, Method::Put)
    }

    /// Modifie le titre et/ou la description de la playlist
    pub fn edit(&self, changes: &PlaylistEdit) -> Result<MediaContainer> {
        let rating_key = self
            .rating_key
            .ok_or(PlexError::MissingAttribute("ratingKey"))?;
        let path = format!(
            "/library/metadata/{}{}",
            rating_key,
            join_args(&[
                ("title", changes.title.clone()),
                ("summary", changes.summary.clone()),
            ])
        );
        self.server.submit(&path, Method::Put)
    }

    /// Supprime la playlist du serveur.
    ///
    /// Un second appel remonte l'erreur renvoyée par le serveur.
    pub fn delete(&self) -> Result<MediaContainer> {
        let key = self.require_key()?;
        self.server.submit(key, Method::Delete)
    }

    /// Crée une playlist à partir d'éléments existants.
    ///
    /// Les éléments doivent tous être de la catégorie du premier.
    pub fn create(
        server: Arc<dyn PlexServer>,
        title: &str,
        items: &[&dyn PlaylistItem],
    ) -> Result<Self> {
        let first = items.first().ok_or(PlexError::EmptyBatch)?;
        let expected = first.kind();
        for item in items {
            let found = item.kind();
            if found != expected {
                return Err(PlexError::MixedKinds { expected, found });
            }
        }

        let uri = batch_uri(server.as_ref(), items)?;
        let path = format!(
            "/playlists{}",
            join_args(&[
                ("uri", Some(uri)),
                ("type", Some(expected.to_string())),
                ("title", Some(title.to_string())),
                ("smart", Some("0".to_string())),
            ])
        );
        debug!("Creating playlist {:?} with {} items", title, items.len());

        let response = server.submit(&path, Method::Post)?;
        let record = response
            .first()
            .ok_or_else(|| PlexError::NotFound(format!("created playlist {:?}", title)))?;
        Ok(Self::build(server.clone(), record, &path))
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playlist")
            .field("rating_key", &self.rating_key)
            .field("key", &self.key)
            .field("title", &self.title)
            .field("playlist_type", &self.playlist_type)
            .field("leaf_count", &self.leaf_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_items_suffix() {
        assert_eq!(
            strip_items_suffix(Attr::Str("/library/playlists/3/items".to_string())),
            Attr::Str("/library/playlists/3".to_string())
        );
        assert_eq!(
            strip_items_suffix(Attr::Str("/playlists/3".to_string())),
            Attr::Str("/playlists/3".to_string())
        );
        assert_eq!(strip_items_suffix(Attr::Absent), Attr::Absent);
        assert_eq!(strip_items_suffix(Attr::Str("/items".to_string())), Attr::Absent);
    }

    #[test]
    fn test_edit_builder() {
        let edit = PlaylistEdit::new().title("X");
        assert_eq!(edit.title.as_deref(), Some("X"));
        assert_eq!(edit.summary, None);

        let edit = PlaylistEdit::new().summary("");
        assert_eq!(edit.summary.as_deref(), Some(""));
    }
}

//! # pmoplex - Client Plex Media Server pour PMOMusic
//!
//! Cette crate fournit un accès aux playlists d'un serveur Plex : lecture des
//! playlists et de leurs éléments, ajout, retrait et déplacement d'éléments,
//! modification des métadonnées, suppression et création.
//!
//! ## Architecture
//!
//! - `hydrate` : conversion des attributs textuels du serveur en valeurs typées
//! - `record` : enregistrements bruts et parsing des réponses XML
//! - `object` : schémas d'attributs et construction générique des objets
//! - `media` / `playlist` : les objets Plex et leurs opérations
//! - `library` : construction selon le type et recherche de playlists
//! - `server` : accès réseau (trait [`PlexServer`] et client HTTP bloquant)
//! - `query` : encodage des paramètres de requête
//! - `config_ext` : configuration (YAML + variables d'environnement)
//! - `error` : gestion des erreurs
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pmoplex::{HttpPlexServer, PlaylistEdit, PlexServer, library};
//!
//! # fn main() -> pmoplex::Result<()> {
//! let server: Arc<dyn PlexServer> =
//!     Arc::new(HttpPlexServer::new("http://192.168.1.10:32400", Some("token".into())));
//!
//! let playlist = library::playlist(server.clone(), "Jazz")?;
//! for item in playlist.items()? {
//!     println!("{:?}", item.title);
//! }
//!
//! playlist.edit(&PlaylistEdit::new().title("Jazz classics"))?;
//! # Ok(())
//! # }
//! ```
//!
//! Les objets sont des projections : après une modification, il faut relire
//! la playlist ([`Playlist::reload`]) pour obtenir l'état du serveur.

pub mod config_ext;
pub mod error;
pub mod hydrate;
pub mod library;
pub mod media;
pub mod object;
pub mod playlist;
pub mod query;
pub mod record;
pub mod server;

pub use config_ext::PlexConfig;
pub use error::{PlexError, Result};
pub use hydrate::{Attr, FieldType, hydrate};
pub use library::LibraryItem;
pub use media::{KindTag, MediaItem, PlaylistItem};
pub use object::{Field, Hydrated, PlexObject, Schema};
pub use playlist::{Playlist, PlaylistEdit};
pub use query::join_args;
pub use record::{MediaContainer, RawRecord, parse_container};
pub use server::{HttpPlexServer, Method, PlexServer};

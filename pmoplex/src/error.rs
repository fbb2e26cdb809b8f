//! Gestion des erreurs pour le client Plex

use crate::media::KindTag;
use thiserror::Error;

/// Type Result personnalisé pour pmoplex
pub type Result<T> = std::result::Result<T, PlexError>;

/// Erreurs possibles lors de l'utilisation du client Plex
#[derive(Error, Debug)]
pub enum PlexError {
    /// Mélange de types de médias dans un même lot (vérifié avant toute requête)
    #[error("Can not mix media types when building a playlist: {expected} and {found}")]
    MixedKinds { expected: KindTag, found: KindTag },

    /// Lot d'éléments vide
    #[error("At least one item is required")]
    EmptyBatch,

    /// Attribut nécessaire à la construction d'un chemin absent de l'objet
    #[error("Missing attribute: {0}")]
    MissingAttribute(&'static str),

    /// Ressource non trouvée
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Le serveur a répondu avec un statut d'erreur
    #[error("({status}) {body}")]
    BadRequest { status: u16, body: String },

    /// Erreur HTTP (connexion, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    /// Erreur de parsing XML
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl PlexError {
    /// Crée une erreur depuis un statut HTTP et le corps de la réponse
    pub fn from_status_code(status: u16, body: impl Into<String>) -> Self {
        match status {
            404 => Self::NotFound(body.into()),
            _ => Self::BadRequest {
                status,
                body: body.into(),
            },
        }
    }

    /// Vérifie si l'erreur a été levée localement, avant tout appel réseau
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PlexError::MixedKinds { .. } | PlexError::EmptyBatch | PlexError::MissingAttribute(_)
        )
    }
}

impl From<quick_xml::Error> for PlexError {
    fn from(e: quick_xml::Error) -> Self {
        PlexError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for PlexError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        PlexError::Xml(e.to_string())
    }
}

//! Accès réseau au serveur Plex
//!
//! Les objets (playlists, médias) ne parlent jamais HTTP directement : ils
//! passent par le trait [`PlexServer`], qui exécute une requête sur un chemin
//! et renvoie le [`MediaContainer`] parsé. [`HttpPlexServer`] en est
//! l'implémentation bloquante basée sur ureq.

use std::time::Duration;

use tracing::{debug, warn};
use ureq::{Agent, RequestBuilder};

use crate::config_ext::PlexConfig;
use crate::error::{PlexError, Result};
use crate::record::{MediaContainer, RawRecord, parse_container};

/// Timeout HTTP par défaut
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Méthode HTTP d'une requête
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborateur réseau partagé par tous les objets d'une même session
pub trait PlexServer: Send + Sync {
    /// Exécute une requête sur `path` (chemin relatif au serveur, requête comprise)
    fn query(&self, path: &str, method: Method) -> Result<MediaContainer>;

    /// Récupère le premier enregistrement renvoyé par `path`
    fn fetch(&self, path: &str) -> Result<RawRecord> {
        self.query(path, Method::Get)?
            .into_children()
            .into_iter()
            .next()
            .ok_or_else(|| PlexError::NotFound(path.to_string()))
    }

    /// Récupère tous les enregistrements renvoyés par `path`
    fn fetch_many(&self, path: &str) -> Result<Vec<RawRecord>> {
        Ok(self.query(path, Method::Get)?.into_children())
    }

    /// Envoie une requête de modification (PUT, POST ou DELETE)
    fn submit(&self, path: &str, method: Method) -> Result<MediaContainer> {
        self.query(path, method)
    }
}

/// Implémentation HTTP bloquante du collaborateur réseau
pub struct HttpPlexServer {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpPlexServer {
    /// Crée un client pour le serveur `base_url` (ex: `http://192.168.1.10:32400`)
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_timeout(base_url, token, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        // Les statuts 4xx/5xx sont traités ici pour garder le corps de la réponse
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Crée un client depuis la configuration
    pub fn from_config(config: &PlexConfig) -> Result<Self> {
        let url = config.get_server_url()?;
        let token = config.get_server_token()?;
        let timeout = Duration::from_secs(config.get_timeout_secs()?);
        Ok(Self::with_timeout(url, token, timeout))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Ajoute les en-têtes communs à toutes les requêtes
    fn decorate<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        let request = request.header("Accept", "application/xml");
        match &self.token {
            Some(token) => request.header("X-Plex-Token", token.as_str()),
            None => request,
        }
    }

    /// URL complète pour un chemin du serveur
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl PlexServer for HttpPlexServer {
    fn query(&self, path: &str, method: Method) -> Result<MediaContainer> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let response = match method {
            Method::Get => self.decorate(self.agent.get(&url)).call(),
            Method::Delete => self.decorate(self.agent.delete(&url)).call(),
            Method::Put => self.decorate(self.agent.put(&url)).send_empty(),
            Method::Post => self.decorate(self.agent.post(&url)).send_empty(),
        };

        let mut response = response?;
        let status = response.status();
        let body = response.body_mut().read_to_string()?;

        debug!("Response status: {}", status);

        if !status.is_success() {
            warn!("Plex error ({}) on {} {}: {}", status.as_u16(), method, path, body);
            return Err(PlexError::from_status_code(status.as_u16(), body));
        }

        parse_container(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let server = HttpPlexServer::new("http://plex.local:32400/", None);
        assert_eq!(server.base_url(), "http://plex.local:32400");
        assert_eq!(server.url("/playlists"), "http://plex.local:32400/playlists");
        assert_eq!(server.url("playlists"), "http://plex.local:32400/playlists");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}

//! Enregistrements bruts renvoyés par le serveur Plex
//!
//! Le serveur répond par un document XML dont la racine est un
//! `<MediaContainer>`. Chaque élément enfant direct (`<Playlist>`, `<Video>`,
//! `<Track>`, ...) devient un [`RawRecord`] : son nom d'élément et la table de
//! ses attributs. Les éléments plus profonds (`<Media>`, `<Part>`) sont ignorés.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::Result;

/// Enregistrement brut : nom d'élément et attributs textuels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    tag: String,
    attributes: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: HashMap::new(),
        }
    }

    /// Ajoute un attribut (utilisé par le parser et les tests)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Valeur brute d'un attribut, `None` s'il est absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Réponse du serveur : attributs de la racine et enfants directs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaContainer {
    pub attributes: RawRecord,
    pub children: Vec<RawRecord>,
}

impl MediaContainer {
    pub fn first(&self) -> Option<&RawRecord> {
        self.children.first()
    }

    pub fn into_children(self) -> Vec<RawRecord> {
        self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parse le corps d'une réponse XML du serveur.
///
/// Un corps vide (réponse à un PUT/DELETE par exemple) donne un conteneur vide.
pub fn parse_container(body: &str) -> Result<MediaContainer> {
    let mut container = MediaContainer::default();
    if body.trim().is_empty() {
        return Ok(container);
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                collect(&reader, &e, depth, &mut container)?;
                depth += 1;
            }
            Event::Empty(e) => {
                collect(&reader, &e, depth, &mut container)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(
        "Parsed {} container with {} children",
        container.attributes.tag(),
        container.children.len()
    );
    Ok(container)
}

fn collect(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    depth: usize,
    container: &mut MediaContainer,
) -> Result<()> {
    match depth {
        0 => container.attributes = to_record(reader, element)?,
        1 => container.children.push(to_record(reader, element)?),
        _ => {}
    }
    Ok(())
}

fn to_record(reader: &Reader<&[u8]>, element: &BytesStart<'_>) -> Result<RawRecord> {
    let tag = String::from_utf8_lossy(element.name().as_ref()).to_string();
    let mut record = RawRecord::new(tag);
    for attr in element.attributes() {
        let attr = attr?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        record.attributes.insert(name, value);
    }
    Ok(record)
}

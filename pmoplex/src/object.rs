//! Construction des objets Plex à partir des enregistrements bruts
//!
//! Chaque type d'objet déclare un schéma statique : la liste de ses attributs,
//! leur type cible et une éventuelle correction à appliquer après conversion.
//! [`PlexObject::build`] applique ce schéma à un [`RawRecord`] ; c'est la seule
//! routine de construction, commune à tous les types.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::hydrate::{Attr, FieldType, hydrate};
use crate::record::RawRecord;
use crate::server::PlexServer;

/// Description d'un attribut dans un schéma
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub transform: Option<fn(Attr) -> Attr>,
}

impl Field {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            transform: None,
        }
    }

    pub const fn int(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub const fn flag(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Correction appliquée après la conversion de l'attribut
    pub const fn then(mut self, transform: fn(Attr) -> Attr) -> Self {
        self.transform = Some(transform);
        self
    }
}

static ABSENT: Attr = Attr::Absent;

/// Liste ordonnée des attributs d'un type d'objet
pub type Schema = &'static [Field];

/// Attributs typés obtenus en appliquant un schéma à un enregistrement
#[derive(Debug, Clone, Default)]
pub struct Hydrated {
    values: HashMap<&'static str, Attr>,
}

impl Hydrated {
    pub fn apply(record: &RawRecord, schema: Schema) -> Self {
        let values = schema
            .iter()
            .map(|field| {
                let attr = hydrate(record.get(field.name), field.ty);
                let attr = match field.transform {
                    Some(transform) => transform(attr),
                    None => attr,
                };
                (field.name, attr)
            })
            .collect();
        Self { values }
    }

    /// Valeur brute d'un attribut du schéma (`Absent` s'il n'en fait pas partie)
    pub fn get(&self, name: &str) -> &Attr {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).as_int()
    }

    /// Entier positif (identifiants) ; une valeur négative est ignorée
    pub fn uint(&self, name: &str) -> Option<u64> {
        self.int(name).and_then(|v| u64::try_from(v).ok())
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).as_bool()
    }

    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).as_timestamp()
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).as_str().map(str::to_string)
    }
}

/// Contrat commun des objets construits depuis une réponse du serveur
pub trait PlexObject: Sized {
    /// Valeur de l'attribut `type` identifiant ce type d'objet
    const TYPE: &'static str;

    /// Attributs lus à la construction
    const SCHEMA: Schema;

    /// Assemble l'objet à partir de ses attributs typés
    fn from_hydrated(server: Arc<dyn PlexServer>, initpath: String, attrs: Hydrated) -> Self;

    /// Construit l'objet depuis un enregistrement déjà récupéré (aucun accès réseau)
    fn build(server: Arc<dyn PlexServer>, record: &RawRecord, initpath: &str) -> Self {
        debug!(
            "Building {} from <{}> ({} attributes)",
            Self::TYPE,
            record.tag(),
            record.len()
        );
        let attrs = Hydrated::apply(record, Self::SCHEMA);
        Self::from_hydrated(server, initpath.to_string(), attrs)
    }
}

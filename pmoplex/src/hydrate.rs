//! Conversion des attributs bruts renvoyés par le serveur en valeurs typées
//!
//! Le serveur Plex renvoie tous ses attributs sous forme de texte. Ce module
//! les convertit vers le type attendu par le schéma de l'objet. La conversion
//! est totale : une valeur absente ou mal formée donne [`Attr::Absent`],
//! jamais une erreur.

use chrono::{DateTime, Utc};
use tracing::warn;

/// Type cible d'un attribut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Boolean,
    Timestamp,
    String,
}

/// Valeur d'attribut après conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Str(String),
    /// L'attribut n'est pas présent (ou n'a pas pu être converti)
    Absent,
}

impl Attr {
    pub fn is_absent(&self) -> bool {
        matches!(self, Attr::Absent)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attr::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Attr::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Attr::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Nombre de secondes depuis l'epoch, tel que reçu du serveur
    pub fn epoch_seconds(&self) -> Option<i64> {
        self.as_timestamp().map(|t| t.timestamp())
    }
}

/// Convertit une valeur brute vers le type demandé.
///
/// Règles :
/// - `None` donne toujours [`Attr::Absent`]
/// - `Integer` : entier en base 10, sinon `Absent`
/// - `Boolean` : un entier vaut `true` s'il est non nul (`"1"`, `"0"`),
///   `"true"`/`"false"` sont acceptés sans tenir compte de la casse,
///   tout le reste donne `Absent`
/// - `Timestamp` : secondes depuis l'epoch Unix, sinon `Absent`
/// - `String` : la valeur telle quelle
pub fn hydrate(raw: Option<&str>, ty: FieldType) -> Attr {
    let Some(raw) = raw else {
        return Attr::Absent;
    };

    match ty {
        FieldType::Integer => match raw.parse::<i64>() {
            Ok(v) => Attr::Int(v),
            Err(_) => {
                warn!("Invalid integer attribute value: {:?}", raw);
                Attr::Absent
            }
        },
        FieldType::Boolean => match parse_flag(raw) {
            Some(v) => Attr::Bool(v),
            None => {
                warn!("Invalid boolean attribute value: {:?}", raw);
                Attr::Absent
            }
        },
        FieldType::Timestamp => match raw.parse::<i64>().ok().and_then(from_epoch) {
            Some(t) => Attr::Timestamp(t),
            None => {
                warn!("Invalid timestamp attribute value: {:?}", raw);
                Attr::Absent
            }
        },
        FieldType::String => Attr::Str(raw.to_string()),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n != 0);
    }
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

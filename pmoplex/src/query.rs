//! Construction des chaînes de requête

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Caractères laissés tels quels dans les valeurs (le `/` reste lisible)
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Encode une valeur de paramètre
pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, VALUE_ENCODE_SET).to_string()
}

/// Construit la chaîne de requête à ajouter à un chemin.
///
/// Les paramètres sans valeur (`None`) sont omis ; `Some("")` est envoyé vide.
/// Les clés sont triées sans tenir compte de la casse. Retourne une chaîne vide
/// s'il ne reste aucun paramètre, sinon `?clé=valeur&...`.
pub fn join_args(args: &[(&str, Option<String>)]) -> String {
    let mut present: Vec<(&str, &str)> = args
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
        .collect();

    if present.is_empty() {
        return String::new();
    }

    present.sort_by_key(|(key, _)| key.to_lowercase());

    let joined = present
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode_value(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("?{}", joined)
}

//! # Decodificación form-urlencoded
//! src/http/form.rs
//!
//! Se usa para la query string y para bodies con
//! `Content-Type: application/x-www-form-urlencoded`.
//!
//! ```text
//! title=Flowers&artist=Miley+Cyrus  →  {"title": "Flowers", "artist": "Miley Cyrus"}
//! ```

use std::collections::HashMap;

/// Media type que habilita el parsing del body como formulario
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decodifica datos `key=value&key=value`
///
/// - Un segmento sin `=` es una key con valor vacío
/// - `+` se reemplaza por espacio y luego se aplica percent-decoding
/// - Se descartan las keys vacías o formadas solo por espacios
/// - Las keys se guardan en minúsculas (ver [`normalize_key`]), así que
///   `Title` y `title` son la misma key
/// - Si una key se repite, gana la última
///
/// # Ejemplo
/// ```
/// use music_server::http::form::parse_form_encoded;
///
/// let params = parse_form_encoded("title=Flowers&Artist=Miley+Cyrus&flag");
/// assert_eq!(params.get("artist").map(String::as_str), Some("Miley Cyrus"));
/// assert_eq!(params.get("flag").map(String::as_str), Some(""));
/// ```
pub fn parse_form_encoded(data: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for segment in data.split('&') {
        if segment.is_empty() {
            continue;
        }

        let (raw_key, raw_value) = match segment.find('=') {
            Some(eq_pos) => (&segment[..eq_pos], &segment[eq_pos + 1..]),
            None => (segment, ""),
        };

        let key = decode_component(raw_key);
        if key.trim().is_empty() {
            continue;
        }

        params.insert(normalize_key(&key), decode_component(raw_value));
    }

    params
}

/// Forma canónica de una key de parámetro (sin importar mayúsculas)
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// `+` → espacio, después percent-decoding
///
/// Secuencias `%` inválidas se dejan tal cual; bytes que no forman UTF-8
/// válido se reemplazan por U+FFFD.
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned(),
    }
}

/// Indica si el valor de `Content-Type` corresponde a un formulario
///
/// Comparación por prefijo sin importar mayúsculas, así
/// `application/x-www-form-urlencoded; charset=UTF-8` también cuenta.
pub fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .get(..FORM_URLENCODED.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(FORM_URLENCODED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        params.get(key).map(String::as_str)
    }

    #[test]
    fn test_plus_then_percent() {
        let params = parse_form_encoded("artist=Miley+Cyrus&note=a%2Bb&mixed=%C3%A9t%C3%A9+x");
        assert_eq!(get(&params, "artist"), Some("Miley Cyrus"));
        assert_eq!(get(&params, "note"), Some("a+b"));
        assert_eq!(get(&params, "mixed"), Some("été x"));
    }

    #[test]
    fn test_key_without_value() {
        let params = parse_form_encoded("debug&x=");
        assert_eq!(get(&params, "debug"), Some(""));
        assert_eq!(get(&params, "x"), Some(""));
    }

    #[test]
    fn test_value_keeps_later_equals() {
        let params = parse_form_encoded("expr=a=b");
        assert_eq!(get(&params, "expr"), Some("a=b"));
    }

    #[test]
    fn test_blank_keys_are_dropped() {
        let params = parse_form_encoded("=orphan&+=space&%20%20=x&ok=1");
        assert_eq!(params.len(), 1);
        assert_eq!(get(&params, "ok"), Some("1"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let params = parse_form_encoded("id=1&id=2&id=3");
        assert_eq!(get(&params, "id"), Some("3"));
    }

    #[test]
    fn test_keys_ignore_case() {
        let params = parse_form_encoded("Title=Flowers&ARTIST=Miley+Cyrus");
        assert_eq!(get(&params, "title"), Some("Flowers"));
        assert_eq!(get(&params, "artist"), Some("Miley Cyrus"));
    }

    #[test]
    fn test_keys_differing_in_case_collapse() {
        let params = parse_form_encoded("k=1&K=2");
        assert_eq!(params.len(), 1);
        assert_eq!(get(&params, "k"), Some("2"));
    }

    #[test]
    fn test_empty_and_separators_only() {
        assert!(parse_form_encoded("").is_empty());
        assert!(parse_form_encoded("&&&").is_empty());
    }

    #[test]
    fn test_malformed_percent_is_kept() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(decode_component("%FFok"), "\u{FFFD}ok");
    }

    #[test]
    fn test_form_content_type_prefix() {
        assert!(is_form_content_type("application/x-www-form-urlencoded"));
        assert!(is_form_content_type("Application/X-WWW-Form-Urlencoded; charset=utf-8"));
        assert!(!is_form_content_type("application/json"));
        assert!(!is_form_content_type("application/x-www"));
        assert!(!is_form_content_type(""));
    }
}

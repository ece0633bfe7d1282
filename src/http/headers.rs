//! # Mapa de Headers
//! src/http/headers.rs
//!
//! Los nombres de header en HTTP no distinguen mayúsculas. `HeaderMap`
//! compara nombres sin importar el caso, conserva el orden de inserción
//! (la respuesta se serializa en ese orden) y al reinsertar un nombre
//! existente reemplaza el valor en su posición original.

/// Mapa de headers con nombres case-insensitive y orden de inserción
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o reemplaza un header
    ///
    /// Si el nombre ya existe (sin importar mayúsculas) se sobrescribe el valor
    /// y se mantiene el nombre y la posición originales.
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("Content-Type", "text/plain");
    /// headers.insert("content-type", "text/html");
    ///
    /// assert_eq!(headers.len(), 1);
    /// assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
    /// ```
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(index) => self.entries[index].1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itera los headers como `(nombre, valor)` en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

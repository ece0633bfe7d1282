//! # Registro de canciones
//! src/app/songs.rs
//!
//! Almacén en memoria compartido por todos los handlers. Cada operación es
//! atómica por sí sola; no se expone ningún lock.

use chrono::{DateTime, Local};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use uuid::Uuid;

/// Canciones con las que arranca el servidor
pub const DEFAULT_SONGS: [(&str, &str); 4] = [
    ("Taki Taki", "Selena Gomez"),
    ("Espresso", "Sabrina Carpenter"),
    ("Flowers", "Miley Cyrus"),
    ("Levitating", "Dua Lipa"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SongError {
    #[error("Title and artist cannot be empty")]
    Blank,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub added_at: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct SongRegistry {
    songs: DashMap<Uuid, Song>,
    count: AtomicUsize,
}

impl SongRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registro con las canciones de `DEFAULT_SONGS`
    pub fn seeded() -> Self {
        let registry = Self::new();
        for (title, artist) in DEFAULT_SONGS {
            // Los valores por defecto nunca están vacíos
            let _ = registry.add(title, artist);
        }
        registry
    }

    /// Agrega una canción con título y artista recortados
    pub fn add(&self, title: &str, artist: &str) -> Result<Song, SongError> {
        let (title, artist) = (title.trim(), artist.trim());
        if title.is_empty() || artist.is_empty() {
            return Err(SongError::Blank);
        }

        let song = Song {
            id: Uuid::new_v4(),
            title: title.to_string(),
            artist: artist.to_string(),
            added_at: Local::now(),
        };
        self.songs.insert(song.id, song.clone());
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(song)
    }

    /// Retorna `true` si la canción existía
    pub fn remove(&self, id: &Uuid) -> bool {
        if self.songs.remove(id).is_some() {
            self.count.fetch_sub(1, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// Snapshot ordenado por fecha de alta
    pub fn list(&self) -> Vec<Song> {
        let mut songs: Vec<Song> = self.songs.iter().map(|entry| entry.value().clone()).collect();
        songs.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
        songs
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

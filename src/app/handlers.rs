//! # Handlers de la aplicación
//! src/app/handlers.rs
//!
//! Cada handler recibe el estado compartido por `Arc` y retorna una
//! `Response` completa. Los errores de negocio (formulario incompleto, id
//! inválido) se muestran en la página de estado como un bloque de mensaje.

use super::songs::{Song, SongRegistry};
use super::views::{ViewRenderer, INDEX_TEMPLATE};
use crate::http::response::{escape_html, CONTENT_TYPE_HTML, CONTENT_TYPE_JSON};
use crate::http::{Request, Response, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const STATUS_TEMPLATE: &str = "status.html";

/// Cuántas canciones se muestran en la portada
pub const PREVIEW_SIZE: usize = 4;

const EMPTY_PREVIEW: &str = "<li class='empty'>No songs yet</li>";
const EMPTY_LIST: &str = "<div class='song-item empty'>No songs yet</div>";

/// Estilo del bloque de mensaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Error,
}

impl Notice {
    fn css_class(self) -> &'static str {
        match self {
            Notice::Success => "success",
            Notice::Error => "error",
        }
    }
}

/// Dependencias de los handlers
pub struct AppContext {
    pub songs: Arc<SongRegistry>,
    pub views: Arc<ViewRenderer>,
}

/// GET /
pub fn home(ctx: &AppContext, _req: &Request) -> Response {
    let songs = ctx.songs.list();
    let mut model = HashMap::new();
    model.insert("song_count", ctx.songs.count().to_string());
    model.insert("song_preview", song_preview(&songs));

    Response::ok(ctx.views.render(INDEX_TEMPLATE, &model))
}

/// GET /status
pub fn status(ctx: &AppContext, _req: &Request) -> Response {
    render_status(ctx, StatusCode::Ok, None)
}

/// POST /action: agrega una canción con `title` y `artist`
pub fn add_song(ctx: &AppContext, req: &Request) -> Response {
    let title = req.param("title").unwrap_or_default();
    let artist = req.param("artist").unwrap_or_default();

    match ctx.songs.add(title, artist) {
        Ok(song) => {
            info!(id = %song.id, title = %song.title, artist = %song.artist, "song added");
            let message = format!("Song \"{}\" added.", song.title);
            render_status(ctx, StatusCode::Ok, Some((Notice::Success, message)))
        }
        Err(e) => {
            debug!(error = %e, "rejected song form");
            render_status(
                ctx,
                StatusCode::BadRequest,
                Some((Notice::Error, "Title and artist must be filled in.".to_string())),
            )
        }
    }
}

/// POST /delete: elimina la canción con el `id` indicado
pub fn delete_song(ctx: &AppContext, req: &Request) -> Response {
    let raw_id = req.param("id").unwrap_or_default();
    let id = match Uuid::parse_str(raw_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            debug!(id = raw_id, "invalid song id");
            return render_status(
                ctx,
                StatusCode::BadRequest,
                Some((Notice::Error, "Invalid song identifier.".to_string())),
            );
        }
    };

    if ctx.songs.remove(&id) {
        info!(%id, "song removed");
        render_status(ctx, StatusCode::Ok, Some((Notice::Success, "Song removed from the list.".to_string())))
    } else {
        render_status(ctx, StatusCode::NotFound, Some((Notice::Error, "Song not found.".to_string())))
    }
}

/// GET /api/songs: snapshot en JSON
pub fn api_songs(ctx: &AppContext, _req: &Request) -> Response {
    let songs = ctx.songs.list();
    let payload = json!({
        "count": songs.len(),
        "songs": songs,
    });

    match serde_json::to_string_pretty(&payload) {
        Ok(body) => Response::json(body),
        Err(e) => {
            error!(error = %e, "could not serialize songs");
            Response::new(
                StatusCode::InternalServerError,
                r#"{"error": "serialization failed"}"#,
                CONTENT_TYPE_JSON,
            )
        }
    }
}

fn render_status(ctx: &AppContext, status: StatusCode, notice: Option<(Notice, String)>) -> Response {
    let songs = ctx.songs.list();
    let mut model = HashMap::new();
    model.insert("song_list", song_list(&songs));
    model.insert("song_count", ctx.songs.count().to_string());
    model.insert(
        "message_block",
        notice.map(|(kind, text)| message_block(kind, &text)).unwrap_or_default(),
    );

    Response::new(
        status,
        ctx.views.render(STATUS_TEMPLATE, &model),
        CONTENT_TYPE_HTML,
    )
}

fn song_preview(songs: &[Song]) -> String {
    if songs.is_empty() {
        return EMPTY_PREVIEW.to_string();
    }

    songs
        .iter()
        .take(PREVIEW_SIZE)
        .enumerate()
        .map(|(i, song)| {
            format!(
                "<li class='song-chip'><span class='song-index'>{}</span><div><strong>{}</strong><p>{}</p></div></li>",
                i + 1,
                escape_html(&song.title),
                escape_html(&song.artist)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn song_list(songs: &[Song]) -> String {
    if songs.is_empty() {
        return EMPTY_LIST.to_string();
    }

    songs
        .iter()
        .map(|song| {
            format!(
                "<div class='song-item'><div class='song-meta'>🎵 <strong>{}</strong> - {} <small>{}</small></div>\
                 <form method='post' action='/delete' class='song-actions'>\
                 <input type='hidden' name='id' value='{}' />\
                 <button type='submit' class='song-delete'>Delete song</button></form></div>",
                escape_html(&song.title),
                escape_html(&song.artist),
                song.added_at.format("%d.%m.%Y %H:%M"),
                song.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn message_block(kind: Notice, text: &str) -> String {
    format!("<div class='alert {}'>{}</div>", kind.css_class(), escape_html(text))
}

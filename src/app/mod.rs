//! # Aplicación: catálogo de canciones
//! src/app/mod.rs
//!
//! Capa de negocio montada sobre el router: registro en memoria
//! (`songs`), plantillas HTML (`views`) y los handlers de cada ruta
//! (`handlers`).

pub mod handlers;
pub mod songs;
pub mod views;

use crate::router::{RouteError, Router};
use handlers::AppContext;
use std::sync::Arc;

pub use songs::{Song, SongError, SongRegistry};
pub use views::{ViewError, ViewRenderer};

/// Arma el router con todas las rutas de la aplicación
///
/// Un error acá es de configuración (ruta duplicada) y debe abortar el
/// arranque.
pub fn build_router(songs: Arc<SongRegistry>, views: Arc<ViewRenderer>) -> Result<Router, RouteError> {
    let ctx = Arc::new(AppContext { songs, views });
    let mut router = Router::new();

    let c = Arc::clone(&ctx);
    router.get("/", move |req| handlers::home(&c, req), "Home page")?;

    let c = Arc::clone(&ctx);
    router.get("/status", move |req| handlers::status(&c, req), "Song list")?;

    let c = Arc::clone(&ctx);
    router.post("/action", move |req| handlers::add_song(&c, req), "Add a song")?;

    let c = Arc::clone(&ctx);
    router.post("/delete", move |req| handlers::delete_song(&c, req), "Delete a song")?;

    let c = Arc::clone(&ctx);
    router.get("/api/songs", move |req| handlers::api_songs(&c, req), "Songs as JSON")?;

    Ok(router)
}

//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea pares (método, path normalizado) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! El router se arma una sola vez al arrancar y después se comparte como
//! `Arc<Router>` de solo lectura entre todas las conexiones. La búsqueda
//! es exacta: no hay wildcards ni parámetros en el path. Si no hay handler
//! para la ruta, el propio router responde 404.
//!
//! ## Normalización
//!
//! Se aplica igual al registrar y al despachar, así `/status`, `/status/`
//! y `/status?x=1` son la misma ruta:
//!
//! 1. Quitar espacios alrededor
//! 2. Anteponer `/` si falta
//! 3. Cortar desde el primer `?`
//! 4. Quitar `/` finales si el path tiene más de un carácter

use crate::http::{Method, Request, Response};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Tipo de función handler
///
/// Un handler recibe un Request y retorna una Response. El router los
/// guarda de forma opaca y nunca inspecciona su contenido.
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Body del 404 que genera el router
pub const NOT_FOUND_BODY: &str =
    "<h1>404 Not Found</h1><p>The requested page does not exist.</p><a href='/'>Back to home</a>";

/// Errores de configuración al registrar rutas
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("HTTP method must be provided")]
    BlankMethod,

    #[error("Route path must be provided")]
    BlankPath,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Route '{method} {path}' is already registered")]
    DuplicateRoute { method: Method, path: String },
}

/// Información pública de una ruta registrada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
    pub description: String,
}

/// Clave de búsqueda: (método, path normalizado)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

/// Router que mapea (método, path) a handlers
pub struct Router {
    handlers: HashMap<RouteKey, Handler>,

    /// En orden de registro, para el listado de arranque
    routes: Vec<RouteInfo>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            routes: Vec::new(),
        }
    }

    /// Registra una ruta con su handler
    ///
    /// Falla si el método o el path están vacíos, si el método no es
    /// soportado o si el par normalizado ya existe. Ninguna ruta se
    /// sobrescribe en silencio.
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::router::Router;
    /// use music_server::http::{Request, Response};
    ///
    /// fn hello_handler(_req: &Request) -> Response {
    ///     Response::text("Hello")
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register("get", "/hello/", hello_handler, Some("Saludo")).unwrap();
    ///
    /// assert_eq!(router.routes()[0].path, "/hello");
    /// assert!(router.register("GET", "/hello", hello_handler, None).is_err());
    /// ```
    pub fn register<F>(
        &mut self,
        method: &str,
        path: &str,
        handler: F,
        description: Option<&str>,
    ) -> Result<&RouteInfo, RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        if method.trim().is_empty() {
            return Err(RouteError::BlankMethod);
        }
        if path.trim().is_empty() {
            return Err(RouteError::BlankPath);
        }

        let method: Method = method
            .trim()
            .parse()
            .map_err(|_| RouteError::UnsupportedMethod(method.trim().to_string()))?;
        let key = RouteKey {
            method,
            path: normalize_path(path),
        };

        if self.handlers.contains_key(&key) {
            return Err(RouteError::DuplicateRoute {
                method,
                path: key.path,
            });
        }

        self.routes.push(RouteInfo {
            method,
            path: key.path.clone(),
            description: description.unwrap_or_default().to_string(),
        });
        self.handlers.insert(key, Arc::new(handler));

        Ok(&self.routes[self.routes.len() - 1])
    }

    /// Atajo para `register("GET", ...)`
    pub fn get<F>(&mut self, path: &str, handler: F, description: &str) -> Result<&RouteInfo, RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.register("GET", path, handler, Some(description))
    }

    /// Atajo para `register("POST", ...)`
    pub fn post<F>(&mut self, path: &str, handler: F, description: &str) -> Result<&RouteInfo, RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.register("POST", path, handler, Some(description))
    }

    /// Busca el handler para (método, path) con coincidencia exacta
    /// después de normalizar. `None` significa 404.
    pub fn lookup(&self, method: &str, path: &str) -> Option<&Handler> {
        let method: Method = method.trim().parse().ok()?;
        self.handlers.get(&RouteKey {
            method,
            path: normalize_path(path),
        })
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si no hay handler, retorna un 404 con un enlace a `/`.
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::router::Router;
    /// use music_server::http::{Request, StatusCode};
    ///
    /// let router = Router::new();
    /// let request = Request::parse(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
    /// let response = router.dispatch(&request);
    ///
    /// assert_eq!(response.status(), StatusCode::NotFound);
    /// assert!(response.body().contains("href='/'"));
    /// ```
    pub fn dispatch(&self, request: &Request) -> Response {
        match self.lookup(request.method().as_str(), request.path()) {
            Some(handler) => handler(request),
            None => Response::not_found(NOT_FOUND_BODY),
        }
    }

    /// Rutas registradas en orden de registro
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Normaliza un path para usarlo como clave de ruta
///
/// Un path vacío se resuelve como `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    if let Some(query_start) = normalized.find('?') {
        normalized.truncate(query_start);
    }

    if normalized.len() > 1 {
        let kept = normalized.trim_end_matches('/').len();
        normalized.truncate(kept.max(1));
    }

    normalized
}

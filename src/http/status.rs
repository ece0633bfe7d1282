//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que el servidor sabe emitir. Cada factory de
//! [`Response`](super::Response) elige uno de estos:
//!
//! - **2xx**: Éxito (200 OK, 201 Created)
//! - **3xx**: Redirección (302 Found)
//! - **4xx**: Error del cliente (400, 404, 413)
//! - **5xx**: Error del servidor (500)

/// Códigos de estado HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 201 Created - Se creó un recurso
    Created = 201,

    /// 302 Found - Redirección temporal, requiere header `Location`
    Found = 302,

    /// 400 Bad Request - Request malformado o parámetros inválidos
    BadRequest = 400,

    /// 404 Not Found - Ruta no registrada
    NotFound = 404,

    /// 413 Payload Too Large - Body por encima del límite
    PayloadTooLarge = 413,

    /// 500 Internal Server Error - Falló el handler
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::http::StatusCode;
    /// assert_eq!(StatusCode::Found.as_u16(), 302);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::http::StatusCode;
    /// assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Found => "Found",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

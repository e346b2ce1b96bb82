//! Application routes.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | [`index`] |
//! | `GET /api/songs/{id}/stream` | [`songs::stream`] |
//! | `GET /uploads/{*path}` | [`uploads::serve`] |
//! | `GET /healthz`, `GET /readyz` | [`health`](crate::health) |

pub mod songs;
pub mod uploads;

use serde_json::{Value, json};

use crate::health;
use crate::library::Library;
use crate::response::Json;
use crate::router::Router;
use crate::{Request, Response, Status};

/// Builds the application router around a shared [`Library`].
pub fn app(library: Library) -> Router {
    Router::new()
        .with_state(library)
        .get("/",                       index)
        .get("/api/songs/{id}/stream",  songs::stream)
        .get("/uploads/{*path}",        uploads::serve)
        .get("/healthz",                health::liveness)
        .get("/readyz",                 health::readiness)
}

/// Service banner listing the public endpoints.
pub async fn index(_req: Request) -> Json<Value> {
    Json(json!({
        "message": "cadenza media API",
        "endpoints": {
            "songs": {
                "stream": "GET /api/songs/:id/stream",
            },
            "uploads": "GET /uploads/*path",
            "health": {
                "liveness": "GET /healthz",
                "readiness": "GET /readyz",
            },
        },
    }))
}

/// Fetches the [`Library`] attached to the router. Its absence is a wiring
/// bug, reported as a 500 rather than a panic.
pub(crate) fn library(req: &Request) -> Result<&Library, Response> {
    req.state::<Library>().ok_or_else(|| {
        tracing::error!("no library attached to router");
        Response::error(Status::InternalServerError, "Something went wrong!")
    })
}

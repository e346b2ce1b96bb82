//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve media right now? |

use crate::library::Library;
use crate::{Request, Response, Status};

/// Liveness probe. Always `200 OK` with body `"ok"`; it has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe. `200 ready` while the media root can be listed,
/// `503` otherwise (unmounted volume, wrong permissions).
pub async fn readiness(req: Request) -> Response {
    let ready = match req.state::<Library>() {
        Some(library) => library.is_ready().await,
        None => true,
    };
    if ready {
        Response::text("ready")
    } else {
        Response::status(Status::ServiceUnavailable)
    }
}

//! Cross-cutting HTTP layers.

use axum::http::HeaderName;
use tower_http::cors::{Any, CorsLayer};

/// Response header carrying the next pagination cursor.
pub const X_CURSOR: HeaderName = HeaderName::from_static("x-cursor");

/// Permissive CORS: any origin, method and header. The cursor header is
/// exposed so browser clients can page through listings.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([X_CURSOR])
}

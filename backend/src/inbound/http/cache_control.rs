//! Cache-control policies shared by HTTP handlers.

use actix_web::http::header;

/// Probe and admin responses must never be stored by intermediaries.
pub const NO_STORE: &str = "no-store";

/// Per-user API responses may be cached by the browser only after revalidation.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Header tuple for responses that must not be cached at all.
pub fn no_store_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, NO_STORE)
}

/// Header tuple for responses scoped to the signed-in user.
pub fn private_no_cache_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

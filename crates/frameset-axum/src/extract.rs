//! Handler-side access to the request's invocation.
//!
//! The middleware stores one [`Inv`] per request. `Inv` is a shared handle:
//! every extraction on the same request, whether in a later middleware layer
//! or in the handler, sees and updates the same [`Invocation`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frameset::Invocation;
use tracing::error;

use crate::response::{InvocationExt, RenderFailure};

/// Shared handle to the request's [`Invocation`], attached by
/// [`attach_invocation`](crate::attach_invocation).
///
/// ```rust
/// use axum::{http::StatusCode, response::Response};
/// use frameset_axum::Inv;
///
/// async fn about(inv: Inv) -> Response {
///     inv.lock().set("section", "about");
///     inv.html(StatusCode::OK, "about.html")
/// }
/// ```
///
/// Release any guard from [`lock`](Self::lock) before calling
/// [`html`](Self::html); both take the same lock.
#[derive(Debug, Clone)]
pub struct Inv(Arc<Mutex<Invocation>>);

impl Inv {
    pub fn new(invocation: Invocation) -> Self {
        Inv(Arc::new(Mutex::new(invocation)))
    }

    /// Locks the invocation for reading or updating.
    pub fn lock(&self) -> MutexGuard<'_, Invocation> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Renders with the accumulated state; see [`InvocationExt::html`].
    pub fn html(&self, status: StatusCode, name: &str) -> Response {
        self.lock().html(status, name)
    }

    /// See [`InvocationExt::try_html`].
    pub fn try_html(&self, status: StatusCode, name: &str) -> Result<Response, RenderFailure> {
        self.lock().try_html(status, name)
    }

    /// Returns true if both handles refer to the same invocation.
    pub fn same_as(&self, other: &Inv) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Rejection used when the middleware was not installed on the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingInvocation;

impl IntoResponse for MissingInvocation {
    fn into_response(self) -> Response {
        error!("no invocation on request; is the frameset middleware installed on this route?");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

impl<S> FromRequestParts<S> for Inv
where
    S: Send + Sync,
{
    type Rejection = MissingInvocation;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Inv>()
            .cloned()
            .ok_or(MissingInvocation)
    }
}

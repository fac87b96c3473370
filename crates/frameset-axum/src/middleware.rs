//! Per-request invocation middleware.

use axum::extract::{Request, State};
use axum::middleware::{self as axum_mw, Next};
use axum::response::Response;
use axum::Router;
use frameset::TemplateStore;

use crate::extract::Inv;

/// Inserts a fresh [`Invocation`](frameset::Invocation), wrapped in a shared
/// [`Inv`] handle, into the request extensions, then runs the rest of the
/// chain. Layers that run inside this one (added to the router before it)
/// and the handler all extract the same handle.
///
/// Install with `axum::middleware::from_fn_with_state(store, attach_invocation)`
/// or [`RouterExt::with_frameset`].
pub async fn attach_invocation(
    State(store): State<TemplateStore>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(Inv::new(store.invocation()));
    next.run(request).await
}

/// Router shorthand for installing [`attach_invocation`].
pub trait RouterExt {
    /// Gives every route of this router access to the store through [`Inv`].
    fn with_frameset(self, store: TemplateStore) -> Self;
}

impl<S> RouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_frameset(self, store: TemplateStore) -> Self {
        self.layer(axum_mw::from_fn_with_state(store, attach_invocation))
    }
}

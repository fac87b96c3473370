//! # Frameset for Axum
//!
//! Wires a [`TemplateStore`] into an axum router so every request gets its own
//! [`Invocation`].
//!
//! - [`attach_invocation`]: middleware that inserts a fresh invocation into the
//!   request extensions
//! - [`Inv`]: extractor for the request's shared invocation handle, usable
//!   from handlers and from middleware layered inside [`attach_invocation`]
//! - [`Inv::html`] / [`InvocationExt::html`]: renders and turns the result into
//!   a response
//!
//! ```rust,no_run
//! use axum::{http::StatusCode, response::Response, routing::get, Router};
//! use frameset::{DirSource, TemplateStore};
//! use frameset_axum::{Inv, RouterExt};
//!
//! async fn index(inv: Inv) -> Response {
//!     inv.lock().use_frame("layouts/page.html").set("name", "World");
//!     inv.html(StatusCode::OK, "index.html")
//! }
//!
//! # fn app() -> Result<Router, frameset::RenderError> {
//! let store = TemplateStore::builder(DirSource::new("./templates"))
//!     .frame("layouts/shell.html")
//!     .build()?;
//!
//! let app = Router::new()
//!     .route("/", get(index))
//!     .with_frameset(store);
//! # Ok(app)
//! # }
//! ```

mod extract;
mod middleware;
mod response;

pub use extract::{Inv, MissingInvocation};
pub use middleware::{attach_invocation, RouterExt};
pub use response::{InvocationExt, RenderFailure};

pub use frameset::{Invocation, TemplateStore};

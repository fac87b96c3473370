//! Turning invocations into HTTP responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use frameset::{HtmlPage, Invocation, RenderError};
use tracing::error;

/// A render error on its way to becoming a `500 Internal Server Error`.
///
/// The response body never contains partial output or error details.
#[derive(Debug)]
pub struct RenderFailure(pub RenderError);

impl From<RenderError> for RenderFailure {
    fn from(err: RenderError) -> Self {
        RenderFailure(err)
    }
}

impl IntoResponse for RenderFailure {
    fn into_response(self) -> Response {
        error!(error = %self.0, "render failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

fn page_response(status: StatusCode, page: HtmlPage) -> Response {
    let content_type = page.content_type();
    (status, [(header::CONTENT_TYPE, content_type)], page.body).into_response()
}

/// Response helpers for [`Invocation`].
pub trait InvocationExt {
    /// Renders `name` with frames and returns it as an HTML response.
    ///
    /// Render failures become a `500` with an empty body.
    fn html(&self, status: StatusCode, name: &str) -> Response;

    /// Like [`html`](Self::html), but leaves the failure to the caller.
    fn try_html(&self, status: StatusCode, name: &str) -> Result<Response, RenderFailure>;
}

impl InvocationExt for Invocation {
    fn html(&self, status: StatusCode, name: &str) -> Response {
        self.try_html(status, name)
            .unwrap_or_else(IntoResponse::into_response)
    }

    fn try_html(&self, status: StatusCode, name: &str) -> Result<Response, RenderFailure> {
        let page = self.html_page(status.as_u16(), name)?;
        Ok(page_response(status, page))
    }
}

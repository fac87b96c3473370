//! Routes of the demo site.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use frameset::TemplateStore;
use frameset_axum::{Inv, RenderFailure, RouterExt};
use serde::Serialize;

pub fn router(store: TemplateStore) -> Router {
    let pages = Router::new()
        .route("/", get(index))
        .fallback(not_found)
        .with_frameset(store.clone());

    Router::new()
        .route("/-/reload", post(reload))
        .with_state(store)
        .merge(pages)
}

async fn index(inv: Inv) -> Response {
    inv.lock()
        .use_frame("layouts/page.html")
        .set("name", "visitor")
        .set("items", ["frames", "templates", "layouts"])
        .set_frame_arg("title", "Home");
    inv.html(StatusCode::OK, "pages/index.html")
}

async fn not_found(inv: Inv, uri: Uri) -> Response {
    inv.lock()
        .use_frame("layouts/page.html")
        .set("path", uri.path())
        .set_frame_arg("title", "Not Found");
    inv.html(StatusCode::NOT_FOUND, "pages/not_found.html")
}

#[derive(Debug, Serialize)]
struct Reloaded {
    version: u64,
    templates: usize,
    skipped: Vec<String>,
}

async fn reload(State(store): State<TemplateStore>) -> Result<Json<Reloaded>, RenderFailure> {
    let version = store.rebuild()?;
    let set = store.snapshot();
    Ok(Json(Reloaded {
        version,
        templates: set.len(),
        skipped: set.skipped().iter().map(|s| s.path.clone()).collect(),
    }))
}

//! Message pages: list, create, edit, delete
//!
//! Every handler degrades instead of failing: no connection means an empty
//! list or a plain redirect, and query errors are logged.

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::db::MessageRepo;
use crate::http::extractors::MessageId;
use crate::http::server::AppState;
use crate::http::views;
use crate::models::MessageContent;

const HOME: &str = "/";

/// Form body for create and update
#[derive(Debug, Default, Deserialize)]
pub struct ContentForm {
    #[serde(default)]
    pub content: String,
}

/// GET / - list messages, newest first
async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let (db_status, messages) = match state.db.acquire().await {
        Ok(pool) => match MessageRepo::new(&pool).list().await {
            Ok(messages) => ("Connected and data retrieved".to_string(), messages),
            Err(e) => {
                tracing::error!("Error retrieving messages: {}", e);
                (format!("Connected, but error retrieving data: {}", e), Vec::new())
            }
        },
        Err(e) => {
            tracing::debug!("Rendering home without database: {}", e);
            ("Not connected".to_string(), Vec::new())
        }
    };

    Html(views::home(&db_status, &messages))
}

/// POST /add_message - insert, no-op on empty content
async fn add_message(State(state): State<Arc<AppState>>, Form(form): Form<ContentForm>) -> Redirect {
    let Ok(content) = MessageContent::new(&form.content) else {
        return Redirect::to(HOME);
    };

    if let Ok(pool) = state.db.acquire().await {
        match MessageRepo::new(&pool).create(&content).await {
            Ok(message) => tracing::info!(id = message.id, "message added"),
            Err(e) => tracing::error!("Error adding message: {}", e),
        }
    }

    Redirect::to(HOME)
}

/// GET /edit_message/{id} - edit form, or home if the id is unknown
async fn edit_form(State(state): State<Arc<AppState>>, MessageId(id): MessageId) -> Response {
    let Ok(pool) = state.db.acquire().await else {
        return Redirect::to(HOME).into_response();
    };

    match MessageRepo::new(&pool).get(id).await {
        Ok(Some(message)) => Html(views::edit(&message)).into_response(),
        Ok(None) => Redirect::to(HOME).into_response(),
        Err(e) => {
            tracing::error!("Error fetching message for edit: {}", e);
            Redirect::to(HOME).into_response()
        }
    }
}

/// POST /edit_message/{id} - overwrite content of an existing message
async fn update_message(
    State(state): State<Arc<AppState>>,
    MessageId(id): MessageId,
    Form(form): Form<ContentForm>,
) -> Redirect {
    let Ok(content) = MessageContent::new(&form.content) else {
        return Redirect::to(HOME);
    };

    if let Ok(pool) = state.db.acquire().await {
        match MessageRepo::new(&pool).update(id, &content).await {
            Ok(true) => tracing::info!(id, "message updated"),
            Ok(false) => tracing::info!(id, "attempted to update non-existent message"),
            Err(e) => tracing::error!("Error updating message: {}", e),
        }
    }

    Redirect::to(HOME)
}

/// POST /delete_message/{id} - idempotent delete
async fn delete_message(State(state): State<Arc<AppState>>, MessageId(id): MessageId) -> Redirect {
    if let Ok(pool) = state.db.acquire().await {
        match MessageRepo::new(&pool).delete(id).await {
            Ok(deleted) => tracing::info!(id, deleted, "message delete"),
            Err(e) => tracing::error!("Error deleting message: {}", e),
        }
    }

    Redirect::to(HOME)
}

/// Message routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/add_message", post(add_message))
        .route("/edit_message/{id}", get(edit_form).post(update_message))
        .route("/delete_message/{id}", post(delete_message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::http::test_support::unreachable_state;

    fn app() -> Router {
        router().with_state(Arc::new(unreachable_state(None)))
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn assert_redirects_home(response: &Response) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn home_degrades_without_database() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Not connected"));
        assert!(html.contains("No messages yet"));
    }

    #[tokio::test]
    async fn empty_content_is_noop_redirect() {
        let response = app().oneshot(form_post("/add_message", "content=")).await.unwrap();
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn missing_content_field_is_noop_redirect() {
        let response = app().oneshot(form_post("/add_message", "")).await.unwrap();
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn add_without_database_still_redirects() {
        let response = app()
            .oneshot(form_post("/add_message", "content=hello"))
            .await
            .unwrap();
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn edit_form_without_database_redirects() {
        let response = app()
            .oneshot(Request::builder().uri("/edit_message/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn update_with_empty_content_redirects() {
        let response = app()
            .oneshot(form_post("/edit_message/1", "content="))
            .await
            .unwrap();
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn malformed_id_redirects() {
        let response = app()
            .oneshot(Request::builder().uri("/edit_message/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn delete_without_database_redirects() {
        let response = app()
            .oneshot(form_post("/delete_message/42", ""))
            .await
            .unwrap();
        assert_redirects_home(&response);
    }
}

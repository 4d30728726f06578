use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::backup::BackupService;
use crate::error::AppError;
use crate::producer::Journalist;
use crate::store::ArticleStore;

mod html;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArticleStore>,
    pub backup: Arc<BackupService>,
    pub journalist: Option<Arc<Journalist>>,
    pub job_token: Option<String>,
    pub page_size: u32,
    pub site_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/article/:id", get(article_page))
        .route("/sitemap.xml", get(sitemap))
        .route("/jobs/produce", post(run_produce_job))
        .route("/jobs/backup", post(run_backup_job))
        .with_state(state)
}

/// Readers never see restore or backup trouble, only an empty listing.
async fn homepage(State(state): State<AppState>) -> Html<String> {
    let articles = state.store.list_recent(state.page_size).await;
    Html(html::render_index(&articles))
}

async fn article_page(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.store.get_with_neighbors(id).await {
        Ok(navigation) => Html(html::render_article(&navigation)).into_response(),
        Err(AppError::NotFound) => {
            (StatusCode::NOT_FOUND, "No such article.").into_response()
        }
        Err(e) => {
            tracing::warn!("Article lookup failed: {}", e);
            (StatusCode::NOT_FOUND, "No such article.").into_response()
        }
    }
}

async fn sitemap(State(state): State<AppState>) -> Response {
    let articles = state.store.list_all().await;
    (
        [(header::CONTENT_TYPE, "application/xml")],
        html::render_sitemap(&articles, &state.site_url),
    )
        .into_response()
}

/// Job triggers require a bearer token; the unguessable-URL scheme this
/// replaces offered no authentication at all.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = state.job_token.as_deref() else {
        return Err(
            (StatusCode::SERVICE_UNAVAILABLE, "Job token not configured.").into_response(),
        );
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented == Some(expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Missing or invalid job token.").into_response())
    }
}

async fn run_produce_job(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    tracing::info!("Received a request to run the journalist job");

    let Some(journalist) = state.journalist.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Producer API keys not configured.",
        )
            .into_response();
    };

    match journalist.produce(&state.store).await {
        Ok(article) => (
            StatusCode::OK,
            format!("Stored article {}: {}", article.id, article.headline),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Journalist job failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {}", e),
            )
                .into_response()
        }
    }
}

async fn run_backup_job(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    tracing::info!("Received a request to run the backup job");

    // Failures are logged by the service and deliberately not surfaced
    state.backup.backup().await;
    (StatusCode::OK, "Backup job executed.").into_response()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::models::NewArticle;

    fn test_state(dir: &tempfile::TempDir, job_token: Option<&str>) -> AppState {
        let db_path = dir.path().join("content.db");
        let backup = Arc::new(BackupService::new(
            None,
            "content_backup.db".to_string(),
            db_path.clone(),
        ));
        AppState {
            store: Arc::new(ArticleStore::new(db_path, backup.clone())),
            backup,
            journalist: None,
            job_token: job_token.map(str::to_string),
            page_size: 10,
            site_url: "http://localhost:5001".to_string(),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn homepage_serves_empty_listing_without_store() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir, None));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("No articles yet"));
        assert!(!PathBuf::from(dir.path().join("content.db")).exists());
    }

    #[tokio::test]
    async fn article_page_renders_stored_article() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, None);
        let stored = state
            .store
            .append(NewArticle {
                headline: "Stored headline".to_string(),
                commentary: "Commentary.".to_string(),
                ..NewArticle::default()
            })
            .await
            .unwrap();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/article/{}", stored.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Stored headline"));
    }

    #[tokio::test]
    async fn unknown_article_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir, None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/article/41")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn job_triggers_require_configured_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir, None));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs/backup")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn job_triggers_reject_wrong_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir, Some("secret")));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs/produce")
                    .header("authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn backup_trigger_succeeds_with_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(&dir, Some("secret")));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs/backup")
                    .header("authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Upload problems are swallowed by design, the trigger still answers 200
        assert_eq!(response.status(), StatusCode::OK);
    }
}

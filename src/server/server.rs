use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::content_service::ContentService;
use crate::content_store::{Content, ContentStoreError, ContentUpdate};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;

use super::{http_cache, log_requests, state::ServerState, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Request body for create and patch. Every field is optional, creation
/// fails later if a required one is missing. Both PascalCase and camelCase
/// names bind; any other key is rejected so a misspelled patch cannot
/// succeed as a no-op.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ContentInput {
    #[serde(alias = "title")]
    pub title: Option<String>,
    #[serde(rename = "SubTitle", alias = "subTitle")]
    pub subtitle: Option<String>,
    #[serde(alias = "description")]
    pub description: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(alias = "duration")]
    pub duration: Option<i32>,
    #[serde(alias = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(alias = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(alias = "genreList")]
    pub genre_list: Option<Vec<String>>,
}

impl From<ContentInput> for ContentUpdate {
    fn from(input: ContentInput) -> Self {
        ContentUpdate {
            title: input.title,
            subtitle: input.subtitle,
            description: input.description,
            image_url: input.image_url,
            duration: input.duration,
            start_time: input.start_time,
            end_time: input.end_time,
            genre_list: input.genre_list.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct FilterQuery {
    #[serde(alias = "Title")]
    pub title: Option<String>,
    #[serde(alias = "Genre")]
    pub genre: Option<String>,
}

fn store_error_response(err: ContentStoreError) -> Response {
    let status = match &err {
        // A missing required field is the caller's fault, so 400 rather than 500.
        ContentStoreError::Validation(_) => StatusCode::BAD_REQUEST,
        ContentStoreError::Conflict { .. } => {
            warn!("{}", err);
            StatusCode::CONFLICT
        }
        ContentStoreError::DuplicateId(_) | ContentStoreError::Unavailable(_) => {
            error!("{}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string()).into_response()
}

fn list_response(result: Result<Vec<Content>, ContentStoreError>) -> Response {
    match result {
        Ok(contents) if contents.is_empty() => StatusCode::NOT_FOUND.into_response(),
        Ok(contents) => Json(contents).into_response(),
        Err(err) => store_error_response(err),
    }
}

fn single_response(result: Result<Option<Content>, ContentStoreError>) -> Response {
    match result {
        Ok(Some(content)) => Json(content).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn list_contents(State(service): State<ContentService>) -> Response {
    list_response(service.list_all().await)
}

async fn filter_contents(
    State(service): State<ContentService>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let title = query.title.unwrap_or_default();
    list_response(service.list_filtered(&title, query.genre.as_deref()).await)
}

async fn get_content(State(service): State<ContentService>, Path(id): Path<Uuid>) -> Response {
    single_response(service.get(id).await)
}

async fn create_content(
    State(service): State<ContentService>,
    Json(input): Json<ContentInput>,
) -> Response {
    match service.create(input.into()).await {
        Ok(content) => {
            info!("Created content {} ({})", content.id, content.title);
            Json(content).into_response()
        }
        Err(err) => store_error_response(err),
    }
}

async fn update_content(
    State(service): State<ContentService>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContentInput>,
) -> Response {
    single_response(service.update(id, input.into()).await)
}

async fn delete_content(State(service): State<ContentService>, Path(id): Path<Uuid>) -> Response {
    match service.delete(id).await {
        Ok(deleted) => Json(deleted).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn add_genres(
    State(service): State<ContentService>,
    Path(id): Path<Uuid>,
    Json(genres): Json<Vec<String>>,
) -> Response {
    single_response(service.add_genres(id, &genres).await)
}

async fn remove_genres(
    State(service): State<ContentService>,
    Path(id): Path<Uuid>,
    Json(genres): Json<Vec<String>>,
) -> Response {
    single_response(service.remove_genres(id, &genres).await)
}

pub fn make_app(config: ServerConfig, content_service: ContentService) -> Router {
    let state = ServerState::new(config.clone(), content_service);

    let list_cache = middleware::from_fn_with_state(config.content_cache_age_sec, http_cache);
    let item_cache = middleware::from_fn_with_state(config.item_cache_age_sec, http_cache);

    let content_routes: Router = Router::new()
        .route(
            "/",
            get(list_contents)
                .layer(list_cache.clone())
                .post(create_content),
        )
        .route("/filter", get(filter_contents).layer(list_cache))
        .route(
            "/{id}",
            get(get_content)
                .layer(item_cache)
                .patch(update_content)
                .delete(delete_content),
        )
        .route("/{id}/genre", axum::routing::post(add_genres).delete(remove_genres))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/api/v1/Content", content_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn run_server(
    config: ServerConfig,
    content_service: ContentService,
    shutdown: CancellationToken,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, content_service);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Server stopped");
    Ok(())
}

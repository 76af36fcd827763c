use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use ib_core::Article;
use ib_ingest::default_sources;

use crate::AppState;

#[derive(Serialize)]
pub struct CurateResponse {
    pub success: bool,
    pub added: usize,
    pub titles: Vec<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

fn bearer_matches(headers: &HeaderMap, secret: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", secret))
        .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            success: false,
            message: "Unauthorized".to_string(),
        }),
    )
}

/// Curation trigger, hit on a schedule. Requires the bearer secret; runs the
/// pipeline and reports what was added. Per-item failures stay in the logs.
pub async fn curate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !bearer_matches(&headers, &state.cron_secret) {
        return unauthorized().into_response();
    }

    match state.curator.run().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(CurateResponse {
                success: true,
                added: summary.added(),
                message: summary.message(),
                titles: summary.titles,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("curation run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    message: format!("An unexpected error occurred during curation: {}", e),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

const DEFAULT_LIST_LIMIT: usize = 50;

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    match state.articles.list_articles(limit).await {
        Ok(articles) => Json::<Vec<Article>>(articles).into_response(),
        Err(e) => {
            error!("listing articles failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.articles.get_article(&id).await {
        Ok(Some(article)) => Json(article).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                success: false,
                message: format!("no article with id {}", id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("fetching article {} failed: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub seeded: usize,
}

/// Seeds the curated default source list, skipping sources already present.
/// Bearer-guarded like the trigger; meant for first-run provisioning.
pub async fn seed_sources(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !bearer_matches(&headers, &state.cron_secret) {
        return unauthorized().into_response();
    }

    let existing = match state.sources.list_sources().await {
        Ok(sources) => sources,
        Err(e) => {
            error!("listing sources failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut seeded = 0;
    for source in default_sources() {
        if existing.iter().any(|s| s.feed_url == source.feed_url) {
            continue;
        }
        match state.sources.add_source(&source).await {
            Ok(()) => seeded += 1,
            Err(e) => {
                error!("seeding source \"{}\" failed: {}", source.name, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        success: false,
                        message: e.to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    (
        StatusCode::OK,
        Json(SeedResponse {
            success: true,
            seeded,
        }),
    )
        .into_response()
}

//! HTTP API layer exposing the scoped item search.

use axum::{
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_hub_core::{
    paging::SearchResultPage, ScopedSearch, SearchError, SearchQuery, UserIdentity,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Caller identity taken from request headers. A request without
/// `X-User-Id` runs as the anonymous user.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user: UserIdentity,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(UserIdentity::user)
            .unwrap_or(UserIdentity::Anonymous);
        Ok(Self { user })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub search: ScopedSearch,
}

/// Client-visible failure rendered as `{"errors":[{"msg":..}]}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    msg: String,
}

impl ApiError {
    fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            msg: msg.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorEntry {
    msg: String,
}

#[derive(Serialize)]
struct ErrorBody {
    errors: Vec<ErrorEntry>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            errors: vec![ErrorEntry { msg: self.msg }],
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status = match &err {
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SearchError::Collaborator(e) => {
                error!("search failed: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            msg: err.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(rename = "componentId")]
    component_id: Option<String>,
    q: Option<String>,
    p: Option<String>,
    ps: Option<String>,
}

#[derive(Serialize)]
struct ProjectEntry {
    uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    name: String,
}

#[derive(Serialize)]
struct SearchResponse {
    projects: Vec<ProjectEntry>,
    p: usize,
    ps: usize,
    total: usize,
}

impl From<SearchResultPage> for SearchResponse {
    fn from(page: SearchResultPage) -> Self {
        Self {
            projects: page
                .items
                .into_iter()
                .map(|item| ProjectEntry {
                    uuid: item.id,
                    key: item.key,
                    name: item.name,
                })
                .collect(),
            p: page.page,
            ps: page.page_size,
            total: page.total_matches,
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("The '{name}' parameter is missing")))
}

fn parse_count(value: Option<String>, name: &str) -> Result<Option<usize>, ApiError> {
    value
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| ApiError::bad_request(format!("'{v}' is not a valid value for '{name}'")))
        })
        .transpose()
}

impl SearchParams {
    fn into_query(self) -> Result<SearchQuery, ApiError> {
        Ok(SearchQuery {
            container_id: required(self.component_id, "componentId")?,
            fragment: required(self.q, "q")?,
            page: parse_count(self.p, "p")?,
            page_size: parse_count(self.ps, "ps")?,
        })
    }
}

pub fn router(search: ScopedSearch) -> Router {
    let state = AppState { search };
    Router::new()
        .route(
            "/api/components/search_view_components",
            get(search_view_components),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn search_view_components(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.into_query()?;
    let page = state.search.search(&auth.user, &query).await?;
    Ok(Json(page.into()))
}

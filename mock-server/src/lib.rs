use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub content: String,
    pub rating: String,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmitReview {
    pub content: String,
    pub rating: Value,
}

#[derive(Deserialize)]
pub struct RespondReview {
    pub response: String,
}

pub type Db = Arc<RwLock<Vec<Review>>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/{version}/feedback/feedback", post(submit_review))
        .route("/{version}/feedback/list_feedback", get(list_reviews))
        .route("/{version}/feedback/respond/{id}", post(respond_review))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn ok(status: StatusCode, message: &str, data: Value) -> Reply {
    (status, Json(json!({ "success": true, "message": message, "data": data })))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty())
}

/// Integer rating in 1..=5 from a string or number.
fn parse_rating(rating: &Value) -> Option<u8> {
    let parsed = match rating {
        Value::String(s) => s.trim().parse::<u8>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        _ => None,
    };
    parsed.filter(|r| (1..=5).contains(r))
}

async fn submit_review(
    State(db): State<Db>,
    Path(_version): Path<String>,
    headers: HeaderMap,
    body: Result<Json<SubmitReview>, JsonRejection>,
) -> Reply {
    if !has_bearer(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return fail(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let content = input.content.trim();
    if content.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Content is required");
    }
    let Some(rating) = parse_rating(&input.rating) else {
        return fail(StatusCode::BAD_REQUEST, "Rating must be an integer between 1 and 5");
    };

    let review = Review {
        id: Uuid::new_v4(),
        content: content.to_string(),
        rating: rating.to_string(),
        submitted_at: chrono::Utc::now().to_rfc3339(),
        response: None,
    };
    tracing::info!(id = %review.id, rating, "feedback submitted");
    db.write().await.push(review.clone());
    ok(StatusCode::CREATED, "Feedback submitted", json!(review))
}

async fn list_reviews(State(db): State<Db>, Path(_version): Path<String>) -> Reply {
    let reviews = db.read().await;
    ok(StatusCode::OK, "Feedback retrieved", json!(*reviews))
}

async fn respond_review(
    State(db): State<Db>,
    Path((_version, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<RespondReview>, JsonRejection>,
) -> Reply {
    if !has_bearer(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return fail(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let Ok(id) = Uuid::parse_str(&id) else {
        return fail(StatusCode::NOT_FOUND, "Feedback not found");
    };
    let mut reviews = db.write().await;
    let Some(review) = reviews.iter_mut().find(|review| review.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Feedback not found");
    };
    review.response = Some(input.response);
    tracing::info!(%id, "feedback response attached");
    ok(StatusCode::OK, "Response saved", json!(review))
}

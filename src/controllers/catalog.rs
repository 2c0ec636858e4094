use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Movie, Showtime, Theatre};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cities", get(list_cities))
        .route("/theatres", get(list_theatres))
        .route("/theatres/{id}/movies", get(list_movies))
        .route("/movies/{id}/showtimes", get(list_showtimes))
}

#[derive(Debug, Deserialize)]
struct CitiesQuery {
    q: Option<String>,
}

async fn list_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CitiesQuery>,
) -> Json<Vec<String>> {
    Json(state.catalog.list_cities(params.q.as_deref()).await)
}

#[derive(Debug, Deserialize)]
struct TheatresQuery {
    city: Option<String>,
}

async fn list_theatres(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TheatresQuery>,
) -> Result<Json<Vec<Theatre>>, AppError> {
    let city = params
        .city
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("City is required".to_string()))?;
    Ok(Json(state.catalog.list_theatres_by_city(&city).await))
}

async fn list_movies(
    State(state): State<Arc<AppState>>,
    Path(theatre_id): Path<String>,
) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.catalog.list_movies_for_theatre(&theatre_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowtimesQuery {
    theatre_id: Option<String>,
}

async fn list_showtimes(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    Query(params): Query<ShowtimesQuery>,
) -> Result<Json<Vec<Showtime>>, AppError> {
    let theatre_id = params
        .theatre_id
        .ok_or_else(|| AppError::Validation("theatreId is required".to_string()))?;
    state.catalog.movie(&movie_id).await?;
    Ok(Json(state.catalog.list_showtimes(&movie_id, &theatre_id).await))
}

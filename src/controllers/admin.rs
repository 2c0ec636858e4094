use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::middleware::AdminUser;
use crate::models::{Movie, Showtime};
use crate::services::{NewMovie, NewShowtime};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/movies", post(add_movie))
        .route("/admin/showtimes", post(add_showtime))
}

// POST /api/admin/movies
async fn add_movie(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<NewMovie>,
) -> Result<(StatusCode, Json<Movie>), AppError> {
    let movie = state.catalog.add_movie(req).await?;
    info!("{} added movie {}", admin.id, movie.id);
    Ok((StatusCode::CREATED, Json(movie)))
}

// POST /api/admin/showtimes
async fn add_showtime(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<NewShowtime>,
) -> Result<(StatusCode, Json<Showtime>), AppError> {
    let showtime = state.catalog.add_showtime(req).await?;
    info!("{} added showtime {}", admin.id, showtime.id);
    Ok((StatusCode::CREATED, Json(showtime)))
}

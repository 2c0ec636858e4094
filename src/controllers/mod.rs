pub mod auth;
pub mod booking;
pub mod catalog;
#[cfg(feature = "admin")]
pub mod admin;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    let router = Router::new()
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(booking::routes());

    #[cfg(feature = "admin")]
    let router = router.merge(admin::routes());

    router
}

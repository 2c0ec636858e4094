pub mod booking;
pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sessions;

use axum::{routing::get, Router};
use std::sync::{Arc, Mutex, PoisonError};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use booking::{RandomOccupancy, SeatMap, SeatMapGenerator, SeatPricing};
use config::{Config, NotificationMode};
use services::{
    AuthService, Catalog, HttpNotificationSender, InMemoryCatalog, LogNotificationSender,
    NotificationError, NotificationSender,
};
use sessions::SessionRegistry;

pub use error::AppError;

// Shared state for the whole application
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn Catalog>,
    pub auth: AuthService,
    pub notifier: Arc<dyn NotificationSender>,
    pub sessions: SessionRegistry,
    seat_maps: Mutex<SeatMapGenerator>,
}

impl AppState {
    /// Wires the seeded catalog, the configured mail sender and a seat map
    /// generator driven by the pricing settings.
    pub fn new(config: Config) -> Result<Arc<Self>, NotificationError> {
        let notifier: Arc<dyn NotificationSender> = match config.notification.mode {
            NotificationMode::Http => {
                info!("Mail relay: {}", config.notification.relay_url);
                Arc::new(HttpNotificationSender::from_config(&config.notification)?)
            }
            NotificationMode::Log => {
                info!("Mail relay disabled, notifications go to the log");
                Arc::new(LogNotificationSender)
            }
        };

        let pricing = SeatPricing {
            premium: config.pricing.premium_price,
            regular: config.pricing.regular_price,
        };
        let probability = config.pricing.booked_probability;
        let generator = match config.pricing.seat_map_seed {
            Some(seed) => SeatMapGenerator::new(pricing, RandomOccupancy::seeded(seed, probability)),
            None => SeatMapGenerator::new(pricing, RandomOccupancy::from_entropy(probability)),
        };

        Ok(Self::with_parts(
            config,
            Arc::new(InMemoryCatalog::seeded()),
            notifier,
            generator,
        ))
    }

    pub fn with_parts(
        config: Config,
        catalog: Arc<dyn Catalog>,
        notifier: Arc<dyn NotificationSender>,
        generator: SeatMapGenerator,
    ) -> Arc<Self> {
        let auth = AuthService::new(&config.auth, config.app.brand.clone(), notifier.clone());
        Arc::new(Self {
            config,
            catalog,
            auth,
            notifier,
            sessions: SessionRegistry::new(),
            seat_maps: Mutex::new(generator),
        })
    }

    pub fn generate_seat_map(&self, showtime_id: &str) -> SeatMap {
        self.seat_maps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(showtime_id)
    }
}

/// Full HTTP surface with tracing and CORS applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cinema_booking::{
    booking::{FixedOccupancy, SeatMapGenerator, SeatPricing},
    config::Config,
    router,
    services::{InMemoryCatalog, NotificationError, NotificationSender},
    AppState,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingSender {
    pub outbox: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        self.outbox.lock().unwrap().push(SentMail {
            to: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mail: Arc<RecordingSender>,
}

impl TestApp {
    /// Seeded catalog, codes echoed back, and a seat map where only the given labels are taken.
    pub fn new(booked: &[&str]) -> Self {
        let mut config = Config::default();
        config.auth.expose_otp = true;

        let mail = Arc::new(RecordingSender::default());
        let generator = SeatMapGenerator::new(
            SeatPricing::default(),
            FixedOccupancy::new(booked.iter().map(|s| s.to_string())),
        );
        let state = AppState::with_parts(
            config,
            Arc::new(InMemoryCatalog::seeded()),
            mail.clone(),
            generator,
        );

        Self {
            router: router(state.clone()),
            state,
            mail,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    /// Runs the one-time code login and returns the bearer token.
    pub async fn login(&self, email: &str) -> String {
        let (status, sent) = self
            .request("POST", "/api/auth/send-otp", None, Some(json!({ "email": email })))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", sent);
        let otp = sent["otp"].as_str().unwrap().to_string();

        let (status, session) = self
            .request(
                "POST",
                "/api/auth/verify",
                None,
                Some(json!({ "email": email, "otp": otp })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", session);
        session["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_login(&self) -> String {
        let (status, session) = self
            .request(
                "POST",
                "/api/auth/admin",
                None,
                Some(json!({ "username": "admin", "password": "admin@123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        session["token"].as_str().unwrap().to_string()
    }

    /// Walks the wizard up to seat selection for the given showtime.
    pub async fn open_seats(&self, token: &str, theatre: &str, movie: &str, showtime: &str) -> Value {
        let (status, _) = self
            .request("PUT", "/api/booking/theatre", Some(token), Some(json!({ "theatreId": theatre })))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = self
            .request("PUT", "/api/booking/movie", Some(token), Some(json!({ "movieId": movie })))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, seats) = self
            .request("PUT", "/api/booking/showtime", Some(token), Some(json!({ "showtimeId": showtime })))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", seats);
        seats
    }
}

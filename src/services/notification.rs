//! Outbound messages (one-time codes, ticket summaries).
//!
//! Two senders are provided:
//! 1.  **HttpNotificationSender**: posts the message to a mail relay. Every
//!     call goes through a [`CircuitBreaker`] so a dead relay is not hammered.
//!     There is no retry and no queue: a failed send is reported to the caller.
//! 2.  **LogNotificationSender**: writes the message to the log. Used in
//!     development and tests.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::NotificationConfig;
use crate::models::Ticket;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Mail relay temporarily unavailable")]
    CircuitOpen,
    #[error("Mail relay connection error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Mail relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), NotificationError>;
}

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are refused until the timeout elapses.
    Open,
    /// A single trial call is let through to test whether the relay recovered.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    probe_in_flight: AtomicBool,
    opened_at: Mutex<Option<Instant>>,
    failure_threshold: u32,
    timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout: Duration) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            probe_in_flight: AtomicBool::new(false),
            opened_at: Mutex::new(None),
            failure_threshold: failure_threshold.max(1),
            timeout,
        }
    }

    /// Whether the next call may go out. An open breaker past its timeout moves
    /// to half-open, where only the first caller gets through until it reports back.
    pub fn can_execute(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.claim_probe(),
            CircuitState::Open => {
                let opened_at = *self.opened_at.lock().unwrap_or_else(PoisonError::into_inner);
                let expired = opened_at.map_or(true, |at| at.elapsed() >= self.timeout);
                if !expired {
                    return false;
                }
                {
                    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                    if *state == CircuitState::Open {
                        *state = CircuitState::HalfOpen;
                        info!("Circuit breaker transitioning to HalfOpen state");
                    }
                }
                self.claim_probe()
            }
        }
    }

    fn claim_probe(&self) -> bool {
        self.probe_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state == CircuitState::HalfOpen {
            info!("Circuit breaker recovered - transitioning to Closed state");
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::Relaxed);
        self.probe_in_flight.store(false, Ordering::Release);
    }

    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let open = match *state {
            CircuitState::Closed if failures >= self.failure_threshold => {
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    failures, self.failure_threshold
                );
                true
            }
            CircuitState::HalfOpen => {
                warn!("Circuit breaker probe failed - returning to Open state");
                true
            }
            _ => false,
        };

        if open {
            *state = CircuitState::Open;
            *self.opened_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        }
        self.probe_in_flight.store(false, Ordering::Release);
    }

    pub fn state(&self) -> CircuitState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
}

/// Mail relay client. Posts JSON with a bearer API key.
pub struct HttpNotificationSender {
    http_client: reqwest::Client,
    relay_url: String,
    api_key: String,
    from: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpNotificationSender {
    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotificationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            relay_url: config.relay_url.clone(),
            api_key: config.api_key.clone(),
            from: format!("{} <{}>", config.sender_name, config.sender_address),
            circuit_breaker: CircuitBreaker::new(
                config.failure_threshold,
                Duration::from_secs(config.breaker_timeout_seconds),
            ),
        })
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    async fn post(&self, payload: &MailPayload<'_>) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for HttpNotificationSender {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - not sending mail to {}", address);
            return Err(NotificationError::CircuitOpen);
        }

        let payload = MailPayload {
            from: &self.from,
            to: address,
            subject,
            html_body: body,
        };

        match self.post(&payload).await {
            Ok(()) => {
                self.circuit_breaker.record_success();
                info!("Sent \"{}\" to {}", subject, address);
                Ok(())
            }
            Err(e) => {
                error!("Mail relay request failed: {}", e);
                self.circuit_breaker.record_failure();
                Err(e)
            }
        }
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        info!(to = %address, subject = %subject, "notification\n{}", body);
        Ok(())
    }
}

pub fn otp_email(brand: &str, code: &str, ttl_minutes: i64) -> (String, String) {
    let subject = format!("Your {} OTP Code", brand);
    let body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="text-align: center;">{brand} Authentication</h2>
  <p style="text-align: center;">Your one-time password for {brand} login:</p>
  <div style="font-size: 24px; font-weight: bold; text-align: center; padding: 15px; letter-spacing: 5px;">{code}</div>
  <p style="color: #666; text-align: center; font-size: 14px;">This code will expire in {ttl_minutes} minutes.</p>
</div>"#
    );
    (subject, body)
}

pub fn ticket_email(brand: &str, ticket: &Ticket) -> (String, String) {
    let subject = format!("Your {} tickets for {}", brand, ticket.movie.title);
    let body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2>{title}</h2>
  <p>{theatre}, {location}</p>
  <p>{date} {time} &middot; {screen}</p>
  <p>Seats: {seats}</p>
  <p>Total paid: &#8377;{total}</p>
  <p style="color: #666; font-size: 12px;">Booking {id}</p>
</div>"#,
        title = ticket.movie.title,
        theatre = ticket.theatre.name,
        location = ticket.theatre.location,
        date = ticket.showtime.date,
        time = ticket.showtime.time,
        screen = ticket.showtime.screen,
        seats = ticket.booking.seat_labels().join(", "),
        total = ticket.booking.total_amount,
        id = ticket.booking.id,
    );
    (subject, body)
}

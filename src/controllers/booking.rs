use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::booking::{
    BookingError, BookingSession, Notice, PaymentConfirmation, PaymentRequest, Quote, SelectOutcome,
    TargetCount, WizardStep,
};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::{Booking, Movie, Seat, SeatId, Showtime, Theatre, Ticket};
use crate::services::notification::ticket_email;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking", get(current_session))
        .route("/booking/theatre", put(choose_theatre))
        .route("/booking/movie", put(choose_movie))
        .route("/booking/showtime", put(choose_showtime))
        .route("/booking/seat-count", put(set_seat_count))
        .route("/booking/seats", get(get_seats).delete(clear_seats))
        .route("/booking/seats/{seat_id}", post(select_seat).delete(deselect_seat))
        .route("/booking/checkout", post(checkout))
        .route("/booking/payment", post(payment_callback))
        .route("/booking/ticket", get(get_ticket))
        .route("/booking/reset", post(reset))
}

/* ---------- views ---------- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    step: WizardStep,
    theatre: Option<Theatre>,
    movie: Option<Movie>,
    showtime: Option<Showtime>,
    seat_count: TargetCount,
    selected_seats: Vec<String>,
    total: i64,
    booking: Option<Booking>,
}

impl SessionView {
    fn of(session: &BookingSession) -> Self {
        Self {
            step: session.step(),
            theatre: session.theatre().cloned(),
            movie: session.movie().cloned(),
            showtime: session.showtime().cloned(),
            seat_count: session.selection().target(),
            selected_seats: selected_labels(session),
            total: session.total_amount(),
            booking: session.booking().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatsView {
    showtime_id: String,
    seat_count: TargetCount,
    available: usize,
    seats: Vec<Seat>,
    quote: Quote,
}

impl SeatsView {
    fn of(session: &BookingSession) -> Result<Self, BookingError> {
        let map = session
            .seat_map()
            .ok_or(BookingError::MissingContext("seat map"))?;
        Ok(Self {
            showtime_id: map.showtime_id().to_string(),
            seat_count: session.selection().target(),
            available: map.available_count(),
            seats: map.view(session.selection()),
            quote: Quote::for_selection(session.selection(), map),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoticeView {
    #[serde(flatten)]
    notice: Notice,
    message: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            message: notice.to_string(),
            notice,
        }
    }
}

/// Result of a seat click. Rejections are reported in `notice`, not as errors.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionView {
    #[serde(flatten)]
    step: WizardStep,
    seat_count: TargetCount,
    selected_seats: Vec<String>,
    auto_filled: Vec<String>,
    total: i64,
    notice: Option<NoticeView>,
}

impl SelectionView {
    fn of(session: &BookingSession, auto_filled: &[SeatId], notice: Option<Notice>) -> Self {
        let auto_filled = session
            .seat_map()
            .map(|map| {
                auto_filled
                    .iter()
                    .filter_map(|id| map.get(id))
                    .map(Seat::label)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            step: session.step(),
            seat_count: session.selection().target(),
            selected_seats: selected_labels(session),
            auto_filled,
            total: session.total_amount(),
            notice: notice.map(NoticeView::from),
        }
    }
}

fn selected_labels(session: &BookingSession) -> Vec<String> {
    session
        .seat_map()
        .map(|map| {
            session
                .selection()
                .seats(map)
                .into_iter()
                .map(Seat::label)
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts either a full seat id or a bare label, in any case.
fn resolve_seat(session: &BookingSession, raw: &str) -> Result<SeatId, BookingError> {
    let map = session
        .seat_map()
        .ok_or(BookingError::MissingContext("seat map"))?;
    let prefix = format!("{}-", map.showtime_id());
    let label = raw.strip_prefix(&prefix).unwrap_or(raw);
    Ok(SeatId::from(format!("{}{}", prefix, label.to_ascii_uppercase())))
}

/* ---------- WIZARD STEPS ---------- */

// GET /api/booking
async fn current_session(State(state): State<Arc<AppState>>, user: AuthUser) -> Json<SessionView> {
    let handle = state.sessions.get(&user.principal.id).await;
    let session = handle.lock().await;
    Json(SessionView::of(&session))
}

// PUT /api/booking/theatre
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChooseTheatreRequest {
    theatre_id: String,
}

async fn choose_theatre(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChooseTheatreRequest>,
) -> Result<Json<SessionView>, AppError> {
    let theatre = state.catalog.theatre(&req.theatre_id).await?;

    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    session.choose_theatre(theatre);
    Ok(Json(SessionView::of(&session)))
}

// PUT /api/booking/movie
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChooseMovieRequest {
    movie_id: String,
}

async fn choose_movie(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChooseMovieRequest>,
) -> Result<Json<SessionView>, AppError> {
    let movie = state.catalog.movie(&req.movie_id).await?;

    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    session.choose_movie(movie)?;
    Ok(Json(SessionView::of(&session)))
}

// PUT /api/booking/showtime
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChooseShowtimeRequest {
    showtime_id: String,
}

/// Picks the showtime and opens seat selection with a freshly generated map.
async fn choose_showtime(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChooseShowtimeRequest>,
) -> Result<Json<SeatsView>, AppError> {
    let showtime = state.catalog.showtime(&req.showtime_id).await?;

    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    session.choose_showtime(showtime)?;
    let map = session.enter_seat_selection(|id| state.generate_seat_map(id))?;
    info!(
        "Seat map for {} ready: {} of {} seats available",
        map.showtime_id(),
        map.available_count(),
        map.len()
    );
    Ok(Json(SeatsView::of(&session)?))
}

/* ---------- SEATS ---------- */

// GET /api/booking/seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<SeatsView>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let session = handle.lock().await;
    Ok(Json(SeatsView::of(&session)?))
}

// PUT /api/booking/seat-count
#[derive(Debug, Deserialize)]
struct SeatCountRequest {
    count: u32,
}

async fn set_seat_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SeatCountRequest>,
) -> Result<Json<SelectionView>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    let notice = session.set_target_count(req.count)?;
    Ok(Json(SelectionView::of(&session, &[], notice)))
}

// POST /api/booking/seats/{seat_id}
async fn select_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(seat_id): Path<String>,
) -> Result<Json<SelectionView>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    let id = resolve_seat(&session, &seat_id)?;

    let view = match session.select_seat(&id)? {
        SelectOutcome::Added { auto_filled, .. } => SelectionView::of(&session, &auto_filled, None),
        SelectOutcome::Removed { .. } => SelectionView::of(&session, &[], None),
        SelectOutcome::Rejected(notice) => SelectionView::of(&session, &[], Some(notice)),
    };
    Ok(Json(view))
}

// DELETE /api/booking/seats/{seat_id}
async fn deselect_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(seat_id): Path<String>,
) -> Result<Json<SelectionView>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    let id = resolve_seat(&session, &seat_id)?;
    session.deselect_seat(&id)?;
    Ok(Json(SelectionView::of(&session, &[], None)))
}

// DELETE /api/booking/seats
async fn clear_seats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<SelectionView>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    session.clear_selection()?;
    Ok(Json(SelectionView::of(&session, &[], None)))
}

/* ---------- PAYMENT ---------- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    #[serde(flatten)]
    payment: PaymentRequest,
    name: String,
    email: String,
}

// POST /api/booking/checkout
async fn checkout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<CheckoutResponse>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    let payment = session.begin_payment()?;
    info!(
        "Payment {} opened for {}: {} {}",
        payment.order_id, user.principal.id, payment.amount, payment.currency
    );

    Ok(Json(CheckoutResponse {
        payment,
        name: state.config.app.brand.clone(),
        email: user.principal.email,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PaymentOutcome {
    Success,
    Failure,
}

// POST /api/booking/payment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCallback {
    #[serde(default)]
    payment_id: String,
    status: PaymentOutcome,
    #[serde(default)]
    amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum PaymentResult {
    Booked { ticket: Ticket },
    Failed { message: String, session: SessionView },
}

async fn payment_callback(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<PaymentResult>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;

    if callback.status == PaymentOutcome::Failure {
        let mut session = handle.lock().await;
        if !session.payment_failed() {
            return Err(BookingError::PaymentNotStarted.into());
        }
        warn!("Payment failed for {}", user.principal.id);
        return Ok(Json(PaymentResult::Failed {
            message: "Payment failed. Please try again.".to_string(),
            session: SessionView::of(&session),
        }));
    }

    if callback.payment_id.trim().is_empty() {
        return Err(AppError::Validation("paymentId is required".to_string()));
    }
    let confirmation = PaymentConfirmation {
        payment_id: callback.payment_id,
        amount: callback.amount,
    };

    let ticket = {
        let mut session = handle.lock().await;
        session.confirm_payment(&user.principal, &confirmation)?;
        session
            .ticket()
            .ok_or_else(|| AppError::NotFound("No completed booking".to_string()))?
    };
    info!(
        "Booking {} confirmed for {} (payment {})",
        ticket.booking.id, user.principal.id, confirmation.payment_id
    );

    let (subject, body) = ticket_email(&state.config.app.brand, &ticket);
    if let Err(e) = state.notifier.send(&user.principal.email, &subject, &body).await {
        warn!("Ticket email for booking {} not sent: {}", ticket.booking.id, e);
    }

    Ok(Json(PaymentResult::Booked { ticket }))
}

/* ---------- TICKET & RESET ---------- */

// GET /api/booking/ticket
async fn get_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Ticket>, AppError> {
    let handle = state.sessions.get(&user.principal.id).await;
    let session = handle.lock().await;
    session
        .ticket()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No completed booking".to_string()))
}

// POST /api/booking/reset
async fn reset(State(state): State<Arc<AppState>>, user: AuthUser) -> Json<SessionView> {
    let handle = state.sessions.get(&user.principal.id).await;
    let mut session = handle.lock().await;
    session.reset();
    Json(SessionView::of(&session))
}

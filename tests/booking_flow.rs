mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn full_booking_from_login_to_ticket() {
    let app = TestApp::new(&["C8", "E4"]);
    let token = app.login("viewer@example.com").await;

    let seats = app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;
    assert_eq!(seats["showtimeId"], "showtime-1");
    assert_eq!(seats["seats"].as_array().unwrap().len(), 200);
    assert_eq!(seats["available"], 198);

    let (status, count) = app
        .request("PUT", "/api/booking/seat-count", Some(&token), Some(json!({ "count": 3 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["seatCount"], 3);
    assert!(count["notice"].is_null());

    let (status, picked) = app.request("POST", "/api/booking/seats/C5", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(picked["selectedSeats"], json!(["C5", "C6", "C7"]));
    assert_eq!(picked["autoFilled"], json!(["C6", "C7"]));
    assert_eq!(picked["total"], 450);
    assert_eq!(picked["step"], "seatsChosen");
    assert_eq!(picked["complete"], true);

    let (status, full) = app.request("POST", "/api/booking/seats/E1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full["notice"]["kind"], "capacityReached");
    assert_eq!(full["notice"]["message"], "You can only select 3 seat(s)");
    assert_eq!(full["selectedSeats"], json!(["C5", "C6", "C7"]));

    let (status, checkout) = app.request("POST", "/api/booking/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", checkout);
    assert_eq!(checkout["amount"], 45_000);
    assert_eq!(checkout["currency"], "INR");
    assert_eq!(checkout["description"], "Movie Tickets for Cosmic Odyssey");
    assert_eq!(checkout["email"], "viewer@example.com");
    assert!(checkout["orderId"].as_str().unwrap().starts_with("order-"));

    let (status, paid) = app
        .request(
            "POST",
            "/api/booking/payment",
            Some(&token),
            Some(json!({ "paymentId": "pay_001", "status": "success", "amount": 45_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", paid);
    assert_eq!(paid["status"], "booked");
    let booking = &paid["ticket"]["booking"];
    assert!(booking["id"].as_str().unwrap().starts_with("booking-"));
    assert_eq!(booking["totalAmount"], 450);
    assert_eq!(booking["paymentStatus"], "completed");
    assert_eq!(booking["seats"].as_array().unwrap().len(), 3);

    let (status, ticket) = app.request("GET", "/api/booking/ticket", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["booking"]["id"], booking["id"]);
    assert_eq!(ticket["theatre"]["name"], "Light House Cinemas");

    let outbox = app.mail.outbox.lock().unwrap().clone();
    assert_eq!(outbox.len(), 2);
    assert!(outbox[1].subject.contains("Cosmic Odyssey"));
    assert!(outbox[1].body.contains("C5, C6, C7"));

    let (status, reset) = app.request("POST", "/api/booking/reset", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["step"], "empty");
    assert_eq!(reset["seatCount"], 1);
    assert!(reset["booking"].is_null());

    let (status, _) = app.request("GET", "/api/booking/ticket", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booked_seats_are_refused_with_a_notice() {
    let app = TestApp::new(&["C8"]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;

    let (status, body) = app.request("POST", "/api/booking/seats/C8", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["kind"], "seatBooked");
    assert_eq!(body["notice"]["message"], "This seat is already booked");
    assert_eq!(body["selectedSeats"], json!([]));
}

#[tokio::test]
async fn auto_fill_skips_booked_neighbours_and_falls_back_left() {
    let app = TestApp::new(&["D20"]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;
    app.request("PUT", "/api/booking/seat-count", Some(&token), Some(json!({ "count": 3 })))
        .await;

    let (_, body) = app.request("POST", "/api/booking/seats/D19", Some(&token), None).await;

    assert_eq!(body["selectedSeats"], json!(["D19", "D18", "D17"]));
    assert_eq!(body["autoFilled"], json!(["D18", "D17"]));
}

#[tokio::test]
async fn second_click_toggles_a_seat_off() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;

    app.request("POST", "/api/booking/seats/A1", Some(&token), None).await;
    let (_, body) = app.request("POST", "/api/booking/seats/A1", Some(&token), None).await;

    assert_eq!(body["selectedSeats"], json!([]));
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn invalid_seat_count_is_a_notice() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;

    let (status, body) = app
        .request("PUT", "/api/booking/seat-count", Some(&token), Some(json!({ "count": 9 })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["kind"], "invalidSeatCount");
    assert_eq!(body["seatCount"], 1);
}

#[tokio::test]
async fn demo_theatre_cannot_check_out() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-2", "movie-3", "showtime-5").await;
    app.request("POST", "/api/booking/seats/F10", Some(&token), None).await;

    let (status, body) = app.request("POST", "/api/booking/checkout", Some(&token), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This theatre is in demo mode only");
}

#[tokio::test]
async fn incomplete_selection_cannot_check_out() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;
    app.request("PUT", "/api/booking/seat-count", Some(&token), Some(json!({ "count": 3 })))
        .await;
    app.request("POST", "/api/booking/seats/C5", Some(&token), None).await;
    app.request("DELETE", "/api/booking/seats/C6", Some(&token), None).await;

    let (status, body) = app.request("POST", "/api/booking/checkout", Some(&token), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Please select 3 seat(s)");
}

#[tokio::test]
async fn failed_payment_keeps_the_selection() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-2", "showtime-3").await;
    app.request("POST", "/api/booking/seats/B3", Some(&token), None).await;
    app.request("POST", "/api/booking/checkout", Some(&token), None).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/booking/payment",
            Some(&token),
            Some(json!({ "status": "failure" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["session"]["step"], "seatsChosen");
    assert_eq!(body["session"]["selectedSeats"], json!(["B3"]));
}

#[tokio::test]
async fn payment_without_checkout_is_a_conflict() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;
    app.request("POST", "/api/booking/seats/A1", Some(&token), None).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/booking/payment",
            Some(&token),
            Some(json!({ "paymentId": "pay_1", "status": "success", "amount": 7_000 })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn underpaid_confirmation_is_refused() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;
    app.request("POST", "/api/booking/seats/A1", Some(&token), None).await;
    app.request("POST", "/api/booking/checkout", Some(&token), None).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/booking/payment",
            Some(&token),
            Some(json!({ "paymentId": "pay_1", "status": "success", "amount": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, session) = app.request("GET", "/api/booking", Some(&token), None).await;
    assert_eq!(session["step"], "paymentPending");
}

#[tokio::test]
async fn showtime_from_another_theatre_is_refused() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.request("PUT", "/api/booking/theatre", Some(&token), Some(json!({ "theatreId": "theatre-1" })))
        .await;
    app.request("PUT", "/api/booking/movie", Some(&token), Some(json!({ "movieId": "movie-3" })))
        .await;

    let (status, _) = app
        .request("PUT", "/api/booking/showtime", Some(&token), Some(json!({ "showtimeId": "showtime-5" })))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn users_do_not_share_sessions() {
    let app = TestApp::new(&[]);
    let alice = app.login("alice@example.com").await;
    let bob = app.login("bob@example.com").await;
    app.open_seats(&alice, "theatre-1", "movie-1", "showtime-1").await;

    let (_, session) = app.request("GET", "/api/booking", Some(&bob), None).await;

    assert_eq!(session["step"], "empty");
}

#[tokio::test]
async fn wizard_requires_a_bearer_token() {
    let app = TestApp::new(&[]);

    let (status, body) = app.request("GET", "/api/booking", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing or invalid session token");

    let (status, _) = app.request("GET", "/api/booking", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn completed_booking_freezes_the_seats() {
    let app = TestApp::new(&[]);
    let token = app.login("a@b.c").await;
    app.open_seats(&token, "theatre-1", "movie-1", "showtime-1").await;
    app.request("POST", "/api/booking/seats/A1", Some(&token), None).await;
    app.request("POST", "/api/booking/checkout", Some(&token), None).await;
    let (status, _) = app
        .request(
            "POST",
            "/api/booking/payment",
            Some(&token),
            Some(json!({ "paymentId": "pay_9", "status": "success", "amount": 7_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("POST", "/api/booking/seats/A1", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This session already holds a completed booking");

    let (status, _) = app.request("DELETE", "/api/booking/seats", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .request("PUT", "/api/booking/seat-count", Some(&token), Some(json!({ "count": 2 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, session) = app.request("GET", "/api/booking", Some(&token), None).await;
    assert_eq!(session["step"], "booked");
    assert_eq!(session["selectedSeats"], json!(["A1"]));
    assert_eq!(session["total"], 70);
    assert_eq!(session["booking"]["totalAmount"], 70);
}

#[tokio::test]
async fn logging_out_one_device_keeps_the_wizard_on_another() {
    let app = TestApp::new(&[]);
    let phone = app.login("viewer@example.com").await;
    let laptop = app.login("viewer@example.com").await;
    app.open_seats(&phone, "theatre-1", "movie-1", "showtime-1").await;
    app.request("POST", "/api/booking/seats/C5", Some(&phone), None).await;

    let (status, _) = app.request("POST", "/api/auth/logout", Some(&laptop), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, session) = app.request("GET", "/api/booking", Some(&phone), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["step"], "seatsChosen");
    assert_eq!(session["selectedSeats"], json!(["C5"]));

    app.request("POST", "/api/auth/logout", Some(&phone), None).await;
    assert!(app.state.sessions.is_empty().await);
}

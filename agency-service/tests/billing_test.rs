mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn billing_computes_the_full_breakdown() {
    let app = TestApp::spawn().await;

    let booking_id = app.create_completed_booking().await;
    // 150 km at the default 15/km, 300 allowance, 50 toll, 5% GST, 1000 advance.
    let bill = app.bill_booking(&booking_id).await;

    assert_eq!(bill["total_km"], 150.0);
    assert_eq!(bill["base_amount"], 2250.0);
    assert_eq!(bill["sub_total"], 2600.0);
    assert_eq!(bill["gst_amount"], 130.0);
    assert_eq!(bill["grand_total"], 2730.0);
    assert_eq!(bill["balance_due"], 1730.0);
    assert_eq!(bill["status"], "Due");
    assert_eq!(bill["booking_id"], booking_id.as_str());
    assert!(bill["payments"].as_array().unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn billing_rejects_reversed_odometer_readings() {
    let app = TestApp::spawn().await;

    let booking_id = app.create_completed_booking().await;
    let response = app
        .post(
            &format!("/bookings/{booking_id}/bill"),
            &json!({ "opening_km": 250.0, "closing_km": 100.0 }),
        )
        .await;
    assert_eq!(response.status(), 400);

    // The booking is still billable afterwards.
    let bill = app.bill_booking(&booking_id).await;
    assert_eq!(bill["grand_total"], 2730.0);

    app.cleanup().await;
}

#[tokio::test]
async fn billing_requires_a_completed_booking() {
    let app = TestApp::spawn().await;

    let booking = app.create_booking().await;
    let booking_id = booking["id"].as_str().unwrap();
    let response = app
        .post(
            &format!("/bookings/{booking_id}/bill"),
            &json!({ "opening_km": 100.0, "closing_km": 250.0 }),
        )
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn billing_flips_the_booking_and_cannot_repeat() {
    let app = TestApp::spawn().await;

    let booking_id = app.create_completed_booking().await;
    app.bill_booking(&booking_id).await;

    let booking: serde_json::Value = app
        .get(&format!("/bookings/{booking_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(booking["status"], "Billed");

    // Billed is terminal: no second bill, no cancellation.
    let response = app
        .post(
            &format!("/bookings/{booking_id}/bill"),
            &json!({ "opening_km": 100.0, "closing_km": 250.0 }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .post(&format!("/bookings/{booking_id}/cancel"), &json!({}))
        .await;
    assert_eq!(response.status(), 400);

    let bills: serde_json::Value = app.get("/bills").await.json().await.unwrap();
    assert_eq!(bills.as_array().unwrap().len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn gst_toggle_and_defaults_change_the_totals() {
    let app = TestApp::spawn().await;

    // Defaults only: 150 km * 15 + 300 allowance = 2550, plus 5% GST.
    let booking_id = app.create_completed_booking().await;
    let response = app
        .post(
            &format!("/bookings/{booking_id}/bill"),
            &json!({ "opening_km": 100.0, "closing_km": 250.0 }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["sub_total"], 2550.0);
    assert_eq!(bill["gst_amount"], 127.5);
    assert_eq!(bill["grand_total"], 2677.5);

    // GST off on a second booking.
    let booking_id = app.create_completed_booking().await;
    let response = app
        .post(
            &format!("/bookings/{booking_id}/bill"),
            &json!({ "opening_km": 100.0, "closing_km": 250.0, "gst_enabled": false }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["gst_amount"], 0.0);
    assert_eq!(bill["grand_total"], 2550.0);

    app.cleanup().await;
}

#[tokio::test]
async fn advance_beyond_the_total_starts_the_bill_paid() {
    let app = TestApp::spawn().await;

    let booking_id = app.create_completed_booking().await;
    let response = app
        .post(
            &format!("/bookings/{booking_id}/bill"),
            &json!({
                "opening_km": 100.0,
                "closing_km": 250.0,
                "toll_parking": 50.0,
                "advance": 5000.0
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["status"], "Paid");
    assert_eq!(bill["balance_due"], -2270.0);

    app.cleanup().await;
}

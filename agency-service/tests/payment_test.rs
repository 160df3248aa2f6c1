mod common;

use common::TestApp;
use serde_json::json;

async fn billed_bill(app: &TestApp) -> (String, f64) {
    let booking_id = app.create_completed_booking().await;
    let bill = app.bill_booking(&booking_id).await;
    let bill_id = bill["id"].as_str().unwrap().to_string();
    let balance = bill["balance_due"].as_f64().unwrap();
    (bill_id, balance)
}

#[tokio::test]
async fn partial_payments_reduce_the_balance() {
    let app = TestApp::spawn().await;
    let (bill_id, balance) = billed_bill(&app).await;
    assert_eq!(balance, 1730.0);

    let response = app
        .post(
            &format!("/bills/{bill_id}/payments"),
            &json!({ "amount": 500.0, "note": "cash at office" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["balance_due"], 1230.0);
    assert_eq!(bill["status"], "Due");

    let response = app
        .post(&format!("/bills/{bill_id}/payments"), &json!({ "amount": 700.0 }))
        .await;
    assert_eq!(response.status(), 200);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["balance_due"], 530.0);

    let payments = bill["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0]["amount"], 500.0);
    assert_eq!(payments[0]["note"], "cash at office");
    assert_eq!(payments[1]["amount"], 700.0);
    // grand_total == advance + ledger + balance_due
    assert_eq!(bill["grand_total"], 2730.0);
    assert_eq!(bill["advance"], 1000.0);

    app.cleanup().await;
}

#[tokio::test]
async fn exact_payoff_settles_the_bill() {
    let app = TestApp::spawn().await;
    let (bill_id, balance) = billed_bill(&app).await;

    let response = app
        .post(&format!("/bills/{bill_id}/payments"), &json!({ "amount": balance }))
        .await;
    assert_eq!(response.status(), 200);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["balance_due"], 0.0);
    assert_eq!(bill["status"], "Paid");

    // A settled bill accepts no further payments.
    let response = app
        .post(&format!("/bills/{bill_id}/payments"), &json!({ "amount": 1.0 }))
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn overpayment_is_rejected_without_mutation() {
    let app = TestApp::spawn().await;
    let (bill_id, balance) = billed_bill(&app).await;

    let response = app
        .post(
            &format!("/bills/{bill_id}/payments"),
            &json!({ "amount": balance + 0.01 }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let bill: serde_json::Value = app
        .get(&format!("/bills/{bill_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(bill["balance_due"], balance);
    assert!(bill["payments"].as_array().unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn zero_and_negative_amounts_are_rejected() {
    let app = TestApp::spawn().await;
    let (bill_id, balance) = billed_bill(&app).await;

    // Both fail request validation before reaching the store.
    let response = app
        .post(&format!("/bills/{bill_id}/payments"), &json!({ "amount": 0.0 }))
        .await;
    assert_eq!(response.status(), 422);

    let response = app
        .post(&format!("/bills/{bill_id}/payments"), &json!({ "amount": -5.0 }))
        .await;
    assert_eq!(response.status(), 422);

    let bill: serde_json::Value = app
        .get(&format!("/bills/{bill_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(bill["balance_due"], balance);
    assert!(bill["payments"].as_array().unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn racing_full_payments_let_exactly_one_through() {
    let app = TestApp::spawn().await;
    let (bill_id, balance) = billed_bill(&app).await;

    // Both submissions cover the whole balance; the store's balance guard
    // admits only one of them.
    let path = format!("/bills/{bill_id}/payments");
    let body = json!({ "amount": balance });
    let (first, second) = tokio::join!(app.post(&path, &body), app.post(&path, &body));

    let statuses = [first.status().as_u16(), second.status().as_u16()];
    assert_eq!(statuses.iter().filter(|&&s| s == 200).count(), 1, "{statuses:?}");
    assert!(
        statuses.iter().any(|&s| s == 400 || s == 409),
        "loser should be rejected: {statuses:?}"
    );

    let bill: serde_json::Value = app
        .get(&format!("/bills/{bill_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(bill["balance_due"], 0.0);
    assert_eq!(bill["status"], "Paid");
    assert_eq!(bill["payments"].as_array().unwrap().len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn payment_on_unknown_bill_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            &format!("/bills/{}/payments", uuid::Uuid::new_v4()),
            &json!({ "amount": 100.0 }),
        )
        .await;
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn bills_can_be_filtered_by_status() {
    let app = TestApp::spawn().await;
    let (bill_id, balance) = billed_bill(&app).await;
    billed_bill(&app).await;

    app.post(&format!("/bills/{bill_id}/payments"), &json!({ "amount": balance }))
        .await;

    let due: serde_json::Value = app.get("/bills?status=Due").await.json().await.unwrap();
    assert_eq!(due.as_array().unwrap().len(), 1);

    let paid: serde_json::Value = app.get("/bills?status=Paid").await.json().await.unwrap();
    assert_eq!(paid.as_array().unwrap().len(), 1);
    assert_eq!(paid[0]["id"], bill_id.as_str());

    app.cleanup().await;
}

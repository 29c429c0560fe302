use axum::http::StatusCode;
use serde_json::json;

use crate::common::{self, TestStateBuilder, test_data};

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_enrollment_generates_installments() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;

    let plan = client
        .post_json(
            "/api/v1/payments/plans",
            &json!({
                "name": test_data::unique_username("plan"),
                "license_category": "B",
                "total_amount": 1000.0,
                "installments": 3
            }),
        )
        .await;
    plan.assert_status(StatusCode::CREATED);
    let plan_id = plan.data()["id"].as_str().unwrap().to_string();

    let candidate = client
        .post_json("/api/v1/candidates", &test_data::candidate())
        .await
        .data();
    let candidate_id = candidate["id"].as_str().unwrap().to_string();

    let response = client
        .post_json(
            "/api/v1/payments/enrollments",
            &json!({ "candidate_id": candidate_id, "payment_plan_id": plan_id }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let enrollment = response.data();
    assert_eq!(enrollment["license_category"], "B");
    assert_eq!(enrollment["status"], "active");

    let payments = enrollment["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 3);
    let total: f64 = payments.iter().map(|p| p["amount"].as_f64().unwrap()).sum();
    assert!((total - 1000.0).abs() < 0.001, "installments sum to {total}");
    assert!(payments.iter().all(|p| p["status"] == "pending"));

    // A second active enrollment for the same category is refused
    let response = client
        .post_json(
            "/api/v1/payments/enrollments",
            &json!({ "candidate_id": candidate_id, "payment_plan_id": plan_id }),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Settle the first installment
    let first_id = payments[0]["id"].as_str().unwrap();
    let response = client
        .put_json(
            &format!("/api/v1/payments/{first_id}/mark-paid"),
            &json!({ "method": "cash" }),
        )
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.data()["status"], "paid");

    let response = client
        .put(&format!("/api/v1/payments/{first_id}/mark-paid"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Payment has already been paid");

    // The generic update cannot settle a payment
    let second_id = payments[1]["id"].as_str().unwrap();
    let response = client
        .put_json(
            &format!("/api/v1/payments/{second_id}"),
            &json!({ "status": "paid" }),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = client
        .put_json(
            &format!("/api/v1/payments/{second_id}"),
            &json!({ "status": "overdue" }),
        )
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.data()["status"], "overdue");

    // Cancelling the enrollment cancels what is still open
    let enrollment_id = enrollment["id"].as_str().unwrap();
    let response = client
        .put_json(
            &format!("/api/v1/payments/enrollments/{enrollment_id}"),
            &json!({ "status": "cancelled" }),
        )
        .await;
    response.assert_status(StatusCode::OK);
    let statuses: Vec<String> = response.data()["payments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, ["paid", "cancelled", "cancelled"]);

    let response = client
        .put(&format!("/api/v1/payments/{second_id}/mark-paid"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Cancelled payments cannot be marked as paid");

    let response = client
        .put_json(
            &format!("/api/v1/payments/{second_id}"),
            &json!({ "status": "pending" }),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Cancelled payments cannot change status");

    client.delete(&format!("/api/v1/candidates/{candidate_id}")).await;
    client.delete(&format!("/api/v1/payments/plans/{plan_id}")).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_enrollment_with_unknown_plan() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;

    let response = client
        .post_json(
            "/api/v1/payments/enrollments",
            &json!({
                "candidate_id": uuid::Uuid::new_v4(),
                "payment_plan_id": uuid::Uuid::new_v4()
            }),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "Invalid reference: payment_plan_id does not exist"
    );

    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_negative_payment_amount_rejected() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;

    let response = client
        .post_json(
            "/api/v1/payments",
            &json!({ "candidate_id": uuid::Uuid::new_v4(), "amount": -5 }),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "amount must be a non-negative number");

    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::{Value, json};

use crate::common::{self, TestClient, TestStateBuilder, test_data};

/// Candidate and instructor ids for a fresh pair
async fn create_pair(client: &TestClient) -> (String, String) {
    let candidate = client
        .post_json("/api/v1/candidates", &test_data::candidate())
        .await
        .data();
    let instructor = client
        .post_json("/api/v1/instructors", &test_data::instructor())
        .await
        .data();

    (
        candidate["id"].as_str().unwrap().to_string(),
        instructor["id"].as_str().unwrap().to_string(),
    )
}

fn session(candidate_id: &str, instructor_id: &str, time: &str) -> Value {
    let date = Utc::now().date_naive() + Days::new(7);
    json!({
        "candidate_id": candidate_id,
        "instructor_id": instructor_id,
        "date": date,
        "time": time,
        "duration_minutes": 90,
        "lesson_type": "practical"
    })
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_bad_time_rejected() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (candidate_id, instructor_id) = create_pair(&client).await;

    for time in ["9:00", "25:00", "10h30", "10:60"] {
        let response = client
            .post_json(
                "/api/v1/schedule",
                &session(&candidate_id, &instructor_id, time),
            )
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), "time must be in HH:MM format");
    }

    client.delete(&format!("/api/v1/candidates/{candidate_id}")).await;
    client.delete(&format!("/api/v1/instructors/{instructor_id}")).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_completing_session_adds_hours_once() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (candidate_id, instructor_id) = create_pair(&client).await;

    let response = client
        .post_json(
            "/api/v1/schedule",
            &session(&candidate_id, &instructor_id, "10:00"),
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let session_id = response.data()["id"].as_str().unwrap().to_string();

    let response = client
        .put(&format!("/api/v1/schedule/{session_id}/complete"))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.data()["status"], "completed");

    let progress = client
        .get(&format!("/api/v1/candidates/{candidate_id}/progress"))
        .await
        .data();
    assert_eq!(progress["practical_hours"], 1.5);
    assert_eq!(progress["theory_hours"], 0.0);

    let response = client
        .put(&format!("/api/v1/schedule/{session_id}/complete"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    client.delete(&format!("/api/v1/candidates/{candidate_id}")).await;
    client.delete(&format!("/api/v1/instructors/{instructor_id}")).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_instructor_double_booking_rejected() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (candidate_id, instructor_id) = create_pair(&client).await;
    let (other_candidate, other_instructor) = create_pair(&client).await;

    client
        .post_json(
            "/api/v1/schedule",
            &session(&candidate_id, &instructor_id, "14:00"),
        )
        .await
        .assert_status(StatusCode::CREATED);

    let response = client
        .post_json(
            "/api/v1/schedule",
            &session(&other_candidate, &instructor_id, "14:00"),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.error().contains("Instructor already has a session"));

    for id in [&candidate_id, &other_candidate] {
        client.delete(&format!("/api/v1/candidates/{id}")).await;
    }
    for id in [&instructor_id, &other_instructor] {
        client.delete(&format!("/api/v1/instructors/{id}")).await;
    }
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_completed_session_cannot_be_reopened() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (candidate_id, instructor_id) = create_pair(&client).await;

    let mut body = session(&candidate_id, &instructor_id, "08:00");
    body["duration_minutes"] = json!(60);
    let response = client.post_json("/api/v1/schedule", &body).await;
    response.assert_status(StatusCode::CREATED);
    let session_id = response.data()["id"].as_str().unwrap().to_string();

    client
        .put(&format!("/api/v1/schedule/{session_id}/complete"))
        .await
        .assert_status(StatusCode::OK);

    let response = client
        .put_json(
            &format!("/api/v1/schedule/{session_id}"),
            &json!({ "status": "scheduled" }),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Only scheduled sessions can be updated");

    client
        .put(&format!("/api/v1/schedule/{session_id}/complete"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let progress = client
        .get(&format!("/api/v1/candidates/{candidate_id}/progress"))
        .await
        .data();
    assert_eq!(progress["practical_hours"], 1.0);

    let session = client
        .get(&format!("/api/v1/schedule/{session_id}"))
        .await
        .data();
    assert_eq!(session["status"], "completed");

    client.delete(&format!("/api/v1/candidates/{candidate_id}")).await;
    client.delete(&format!("/api/v1/instructors/{instructor_id}")).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::{Value, json};

use crate::common::{self, TestClient, TestStateBuilder, test_data};

fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_string()
}

/// Practical course and exam for category B. Returns `(course_id, exam_id)`.
async fn create_exam(client: &TestClient, max_candidates: Option<i32>) -> (String, String) {
    let response = client
        .post_json(
            "/api/v1/exams/courses",
            &json!({
                "title": test_data::unique_username("Driving"),
                "license_category": "B",
                "lesson_type": "practical",
                "duration_hours": 20.0
            }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let course_id = id_of(&response.data());

    let response = client
        .post_json(
            "/api/v1/exams",
            &json!({
                "course_id": course_id,
                "exam_type": "practical",
                "date": Utc::now().date_naive() + Days::new(14),
                "time": "09:30",
                "location": "Test centre",
                "max_candidates": max_candidates
            }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    (course_id, id_of(&response.data()))
}

async fn cleanup(client: &TestClient, course_id: &str, exam_id: &str, candidates: &[&str]) {
    client.delete(&format!("/api/v1/exams/{exam_id}")).await;
    client.delete(&format!("/api/v1/exams/courses/{course_id}")).await;
    for id in candidates {
        client.delete(&format!("/api/v1/candidates/{id}")).await;
    }
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_practical_pass_licenses_candidate() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (course_id, exam_id) = create_exam(&client, None).await;

    let candidate_id = id_of(
        &client
            .post_json("/api/v1/candidates", &test_data::candidate())
            .await
            .data(),
    );
    let plan_id = id_of(
        &client
            .post_json(
                "/api/v1/payments/plans",
                &json!({
                    "name": test_data::unique_username("plan"),
                    "license_category": "B",
                    "total_amount": 600.0,
                    "installments": 2
                }),
            )
            .await
            .data(),
    );
    let response = client
        .post_json(
            "/api/v1/payments/enrollments",
            &json!({ "candidate_id": candidate_id, "payment_plan_id": plan_id }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let enrollment_id = id_of(&response.data());

    let response = client
        .post_json(
            &format!("/api/v1/exams/{exam_id}/result"),
            &json!({ "candidate_id": candidate_id, "score": 88.5, "passed": true }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.data()["passed"], true);

    let candidate = client
        .get(&format!("/api/v1/candidates/{candidate_id}"))
        .await
        .data();
    assert_eq!(candidate["status"], "licensed");

    let enrollment = client
        .get(&format!("/api/v1/payments/enrollments/{enrollment_id}"))
        .await
        .data();
    assert_eq!(enrollment["status"], "completed");

    let results = client
        .get(&format!("/api/v1/exams/{exam_id}/results"))
        .await
        .data();
    assert_eq!(results.as_array().unwrap().len(), 1);

    cleanup(&client, &course_id, &exam_id, &[&candidate_id]).await;
    client.delete(&format!("/api/v1/payments/plans/{plan_id}")).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_failed_exam_keeps_status() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (course_id, exam_id) = create_exam(&client, None).await;
    let candidate_id = id_of(
        &client
            .post_json("/api/v1/candidates", &test_data::candidate())
            .await
            .data(),
    );

    client
        .post_json(
            &format!("/api/v1/exams/{exam_id}/result"),
            &json!({ "candidate_id": candidate_id, "score": 41.0, "passed": false }),
        )
        .await
        .assert_status(StatusCode::CREATED);

    let candidate = client
        .get(&format!("/api/v1/candidates/{candidate_id}"))
        .await
        .data();
    assert_eq!(candidate["status"], "registered");

    cleanup(&client, &course_id, &exam_id, &[&candidate_id]).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_concurrent_results_respect_capacity() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (course_id, exam_id) = create_exam(&client, Some(1)).await;

    let mut candidates = Vec::new();
    for _ in 0..4 {
        let body = client
            .post_json("/api/v1/candidates", &test_data::candidate())
            .await
            .data();
        candidates.push(id_of(&body));
    }

    let uri = format!("/api/v1/exams/{exam_id}/result");
    let bodies: Vec<Value> = candidates
        .iter()
        .map(|id| json!({ "candidate_id": id, "passed": false }))
        .collect();
    let (a, b, c, d) = tokio::join!(
        client.post_json(&uri, &bodies[0]),
        client.post_json(&uri, &bodies[1]),
        client.post_json(&uri, &bodies[2]),
        client.post_json(&uri, &bodies[3]),
    );

    let created = [a.status, b.status, c.status, d.status]
        .iter()
        .filter(|status| **status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);

    let results = client.get(&uri.replace("/result", "/results")).await.data();
    assert_eq!(results.as_array().unwrap().len(), 1);

    let ids: Vec<&str> = candidates.iter().map(String::as_str).collect();
    cleanup(&client, &course_id, &exam_id, &ids).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_cancelled_exam_refuses_results() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let (client, admin) = common::authenticated_client(&state).await;
    let (course_id, exam_id) = create_exam(&client, None).await;
    let candidate_id = id_of(
        &client
            .post_json("/api/v1/candidates", &test_data::candidate())
            .await
            .data(),
    );

    client
        .put_json(
            &format!("/api/v1/exams/{exam_id}"),
            &json!({ "status": "cancelled" }),
        )
        .await
        .assert_status(StatusCode::OK);

    let response = client
        .post_json(
            &format!("/api/v1/exams/{exam_id}/result"),
            &json!({ "candidate_id": candidate_id, "passed": true }),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "Cannot record results for a cancelled exam"
    );

    cleanup(&client, &course_id, &exam_id, &[&candidate_id]).await;
    common::db::delete_admin(&state.pool, &admin).await.unwrap();
}

//! HTTP surface tests
//!
//! Exercise the router end to end over the in-memory port
//! implementations: strict request schemas, webhook signature policy,
//! acknowledgement semantics, and the staff guard.

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};

use infra_providers::webhook::build_signature_header;
use interface_api::{create_router, AppState};
use test_utils::Harness;

const WEBHOOK_SECRET: &str = "whsec_test123secret456";
const STAFF_TOKEN: &str = "staff-test-token";

fn server_over(harness: &Harness) -> TestServer {
    let state = AppState {
        service: harness.service.clone(),
        driver: harness.driver.clone(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        staff_token: STAFF_TOKEN.to_string(),
    };
    let router = create_router(state, &["*".to_string()]);
    TestServer::new(router).expect("router must build")
}

fn create_payload() -> Value {
    json!({
        "adults": 2,
        "children": 1,
        "addons": ["photos", "breakfast"],
        "flight_date": "2026-09-12",
        "contact": {
            "name": "Ana Torres",
            "email": "ana.torres@example.com",
            "phone": "+52 55 1234 5678"
        }
    })
}

fn signed_event(reference: &str, event_type: &str) -> (Vec<u8>, String) {
    let payload = json!({
        "id": "evt_http_0001",
        "type": event_type,
        "data": { "object": { "id": reference, "metadata": {} } }
    })
    .to_string()
    .into_bytes();
    let header = build_signature_header(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    (payload, header)
}

fn signature_header_name() -> HeaderName {
    HeaderName::from_static("x-payment-signature")
}

fn staff_header_name() -> HeaderName {
    HeaderName::from_static("x-staff-token")
}

mod booking_creation {
    use super::*;

    #[tokio::test]
    async fn creates_booking_with_server_computed_total() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let response = server.post("/api/v1/bookings").json(&create_payload()).await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["booking"]["total_minor_units"], 1_020_000);
        assert_eq!(body["booking"]["currency"], "MXN");
        assert_eq!(body["booking"]["status"], "pending");
        assert!(body["booking"]["confirmation_code"]
            .as_str()
            .unwrap()
            .starts_with("VUE-20260912-"));
        assert!(body["payment"]["redirect_url"]
            .as_str()
            .unwrap()
            .starts_with("https://"));
    }

    #[tokio::test]
    async fn client_supplied_total_is_rejected_by_schema() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let mut payload = create_payload();
        payload["total"] = json!(1);

        let response = server.post("/api/v1/bookings").json(&payload).await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert!(harness.store.is_empty());
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let mut payload = create_payload();
        payload["contact"]["email"] = json!("not-an-email");

        let response = server.post("/api/v1/bookings").json(&payload).await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_addon_is_rejected() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let mut payload = create_payload();
        payload["addons"] = json!(["jetpack"]);

        let response = server.post("/api/v1/bookings").json(&payload).await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
    }
}

mod booking_lookup {
    use super::*;

    #[tokio::test]
    async fn finds_booking_by_code_and_by_id() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let created: Value = server
            .post("/api/v1/bookings")
            .json(&create_payload())
            .await
            .json();
        let code = created["booking"]["confirmation_code"].as_str().unwrap();
        let id = created["booking"]["booking_id"].as_str().unwrap();

        let by_code = server.get(&format!("/api/v1/bookings/{code}")).await;
        by_code.assert_status_ok();
        let by_code: Value = by_code.json();
        assert_eq!(by_code["booking_id"].as_str().unwrap(), id);

        let by_id = server.get(&format!("/api/v1/bookings/{id}")).await;
        by_id.assert_status_ok();
    }

    #[tokio::test]
    async fn missing_booking_is_404() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let response = server.get("/api/v1/bookings/VUE-20260912-QQQQQQ").await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn garbage_reference_is_400() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let response = server.get("/api/v1/bookings/garbage!!").await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }
}

mod payment_webhook {
    use super::*;

    #[tokio::test]
    async fn success_event_marks_booking_paid() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let created: Value = server
            .post("/api/v1/bookings")
            .json(&create_payload())
            .await
            .json();
        let reference = created["payment"]["reference"].as_str().unwrap();
        let code = created["booking"]["confirmation_code"].as_str().unwrap();

        let (payload, signature) = signed_event(reference, "checkout.session.completed");
        let response = server
            .post("/api/v1/payment-webhook")
            .add_header(
                signature_header_name(),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(payload.into())
            .await;
        response.assert_status_ok();
        let ack: Value = response.json();
        assert_eq!(ack["received"], true);
        assert_eq!(ack["outcome"], "applied");

        let booking: Value = server.get(&format!("/api/v1/bookings/{code}")).await.json();
        assert_eq!(booking["status"], "paid");
        assert_eq!(harness.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_delivery_still_returns_200() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let created: Value = server
            .post("/api/v1/bookings")
            .json(&create_payload())
            .await
            .json();
        let reference = created["payment"]["reference"].as_str().unwrap();

        for expected in ["applied", "already_processed"] {
            let (payload, signature) = signed_event(reference, "checkout.session.completed");
            let response = server
                .post("/api/v1/payment-webhook")
                .add_header(
                    signature_header_name(),
                    HeaderValue::from_str(&signature).unwrap(),
                )
                .bytes(payload.into())
                .await;
            response.assert_status_ok();
            let ack: Value = response.json();
            assert_eq!(ack["outcome"], expected);
        }

        // duplicate delivery emitted no second batch of notifications
        assert_eq!(harness.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn unknown_reference_is_acknowledged_with_200() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let (payload, signature) = signed_event("cs_no_such_session", "checkout.session.completed");
        let response = server
            .post("/api/v1/payment-webhook")
            .add_header(
                signature_header_name(),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(payload.into())
            .await;

        response.assert_status_ok();
        let ack: Value = response.json();
        assert_eq!(ack["outcome"], "not_found");
        assert!(harness.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_with_400() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let (payload, _) = signed_event("cs_whatever", "checkout.session.completed");
        let forged = build_signature_header(&payload, "wrong_secret", Utc::now().timestamp());

        let response = server
            .post("/api/v1/payment-webhook")
            .add_header(
                signature_header_name(),
                HeaderValue::from_str(&forged).unwrap(),
            )
            .bytes(payload.into())
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_signature_header_is_rejected_with_400() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let (payload, _) = signed_event("cs_whatever", "checkout.session.completed");
        let response = server
            .post("/api/v1/payment-webhook")
            .bytes(payload.into())
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }
}

mod staff_check_in {
    use super::*;

    async fn paid_booking_code(server: &TestServer) -> String {
        let created: Value = server
            .post("/api/v1/bookings")
            .json(&create_payload())
            .await
            .json();
        let reference = created["payment"]["reference"].as_str().unwrap();

        let (payload, signature) = signed_event(reference, "checkout.session.completed");
        server
            .post("/api/v1/payment-webhook")
            .add_header(
                signature_header_name(),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(payload.into())
            .await
            .assert_status_ok();

        created["booking"]["confirmation_code"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn check_in_requires_staff_token() {
        let harness = Harness::new();
        let server = server_over(&harness);
        let code = paid_booking_code(&server).await;

        let response = server
            .post(&format!("/api/v1/bookings/{code}/check-in"))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn staff_token_checks_in_a_paid_booking() {
        let harness = Harness::new();
        let server = server_over(&harness);
        let code = paid_booking_code(&server).await;

        let response = server
            .post(&format!("/api/v1/bookings/{code}/check-in"))
            .add_header(staff_header_name(), HeaderValue::from_static(STAFF_TOKEN))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "checked_in");
    }

    #[tokio::test]
    async fn pending_booking_cannot_check_in() {
        let harness = Harness::new();
        let server = server_over(&harness);

        let created: Value = server
            .post("/api/v1/bookings")
            .json(&create_payload())
            .await
            .json();
        let code = created["booking"]["confirmation_code"].as_str().unwrap();

        let response = server
            .post(&format!("/api/v1/bookings/{code}/check-in"))
            .add_header(staff_header_name(), HeaderValue::from_static(STAFF_TOKEN))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn health_and_readiness_respond() {
        let harness = Harness::new();
        let server = server_over(&harness);

        server.get("/health").await.assert_status_ok();
        server.get("/health/ready").await.assert_status_ok();
    }
}

//! Wire-level tests for the HTTP clients against a mock server.

use std::time::Duration;

use maint_collab::{
    AuditEvent, AuditSink, CollaboratorError, DeliveryStatus, FlatUpsert, GenerationError,
    MessagingSender, PaymentLookup, PaymentStore, ReminderRequest, Service, TextGenerator,
};
use maint_http::{AuditClient, EndpointConfig, OllamaClient, PaymentsClient, WhatsAppClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> EndpointConfig {
    EndpointConfig::new(&server.uri()).with_timeout_secs(1)
}

#[tokio::test]
async fn payment_status_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_payment_status"))
        .and(query_param("flat_no", "B-302"))
        .and(query_param("month_year", "2025-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flat_no": "B-302",
            "month_year": "2025-12",
            "is_paid": true,
            "paid_on": "2025-12-03"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PaymentsClient::new(&config(&server)).unwrap();
    let lookup = client.payment_status("B-302", "2025-12").await.unwrap();

    match lookup {
        PaymentLookup::Found(status) => {
            assert!(status.is_paid);
            assert_eq!(status.paid_on.unwrap().to_string(), "2025-12-03");
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[tokio::test]
async fn payment_status_404_is_not_found_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_payment_status"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "No payment record found"})),
        )
        .mount(&server)
        .await;

    let client = PaymentsClient::new(&config(&server)).unwrap();
    let lookup = client.payment_status("Z-999", "2025-12").await.unwrap();

    assert_eq!(
        lookup,
        PaymentLookup::NotFound {
            flat_no: "Z-999".to_string(),
            month_year: "2025-12".to_string(),
        }
    );
}

#[tokio::test]
async fn payment_status_500_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_payment_status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let client = PaymentsClient::new(&config(&server)).unwrap();
    let err = client.payment_status("C-101", "2025-12").await.unwrap_err();

    assert_eq!(
        err,
        CollaboratorError::Status {
            service: Service::Payments,
            status: 500,
            body: "db down".to_string(),
        }
    );
}

#[tokio::test]
async fn payment_status_slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_payment_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"flat_no": "C-101", "month_year": "2025-12", "is_paid": false}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = PaymentsClient::new(&config(&server)).unwrap();
    let err = client.payment_status("C-101", "2025-12").await.unwrap_err();

    assert_eq!(
        err,
        CollaboratorError::Timeout {
            service: Service::Payments
        }
    );
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let client = PaymentsClient::new(&EndpointConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client.list_flats().await.unwrap_err();
    assert!(matches!(
        err,
        CollaboratorError::Transport {
            service: Service::Payments,
            ..
        }
    ));
}

#[tokio::test]
async fn add_flat_posts_all_fields_and_merges_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_flat"))
        .and(body_json(json!({
            "flat_no": "D-404",
            "owner_name": "Jane Doe",
            "phone_number": "+911234567890",
            "whatsapp_number": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "flat_id": 7,
            "flat_no": "D-404"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PaymentsClient::new(&config(&server)).unwrap();
    let flat = client
        .upsert_flat(
            FlatUpsert::new("D-404")
                .with_owner("Jane Doe")
                .with_phone("+911234567890"),
        )
        .await
        .unwrap();

    assert_eq!(flat.flat_id, Some(7));
    assert_eq!(flat.owner_name.as_deref(), Some("Jane Doe"));
    assert_eq!(flat.whatsapp_number, None);
}

#[tokio::test]
async fn list_flats_decodes_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list_flats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"flat_no": "A-110", "owner_name": "Rahul", "phone_number": "+919876543210", "whatsapp_number": null},
            {"flat_no": "C-101", "owner_name": null, "phone_number": null, "whatsapp_number": null}
        ])))
        .mount(&server)
        .await;

    let client = PaymentsClient::new(&config(&server)).unwrap();
    let flats = client.list_flats().await.unwrap();

    assert_eq!(flats.len(), 2);
    assert_eq!(flats[0].flat_no, "A-110");
    assert_eq!(flats[1].owner_name, None);
}

#[tokio::test]
async fn send_reminder_stamps_send_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send_reminder"))
        .and(body_json(json!({"flat_no": "C-101", "month_year": "2025-12"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SENT",
            "message_id": "local-whatsapp-1765000000",
            "flat_no": "C-101",
            "month_year": "2025-12"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WhatsAppClient::new(&config(&server)).unwrap();
    let before = chrono::Utc::now();
    let result = client
        .send_reminder(ReminderRequest {
            flat_no: "C-101".to_string(),
            month_year: "2025-12".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.status, DeliveryStatus::Delivered);
    assert_eq!(result.message_id, "local-whatsapp-1765000000");
    assert!(result.sent_at >= before);
}

#[tokio::test]
async fn log_event_returns_record_with_log_id() {
    let server = MockServer::start().await;
    let details = json!({"reminder": {"message_id": "m-1"}});
    Mock::given(method("POST"))
        .and(path("/log_event"))
        .and(body_json(json!({
            "event_type": "MAINTENANCE_REMINDER_SENT",
            "flat_no": "C-101",
            "month_year": "2025-12",
            "details": details.clone()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "log_id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuditClient::new(&config(&server)).unwrap();
    let record = client
        .log_event(AuditEvent {
            event_type: "MAINTENANCE_REMINDER_SENT".to_string(),
            flat_no: "C-101".to_string(),
            month_year: "2025-12".to_string(),
            details: details.clone(),
        })
        .await
        .unwrap();

    assert_eq!(record.log_id, 42);
    assert_eq!(record.details, details);
}

#[tokio::test]
async fn audit_rejection_surfaces_as_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/log_event"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Flat not found"})))
        .mount(&server)
        .await;

    let client = AuditClient::new(&config(&server)).unwrap();
    let err = client
        .log_event(AuditEvent {
            event_type: "MAINTENANCE_REMINDER_SENT".to_string(),
            flat_no: "Z-999".to_string(),
            month_year: "2025-12".to_string(),
            details: json!({}),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CollaboratorError::Status {
            service: Service::Audit,
            status: 404,
            ..
        }
    ));
}

#[tokio::test]
async fn ollama_chat_sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "model": "llama3",
            "stream": false,
            "messages": [
                {"role": "system", "content": "You are MaintenancePlanner"},
                {"role": "user", "content": "Has B-302 paid for 2025-12?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "{\"action\":\"CHECK_ONLY\"}"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config(&server), "llama3").unwrap();
    let text = client
        .complete("You are MaintenancePlanner", "Has B-302 paid for 2025-12?")
        .await
        .unwrap();

    assert_eq!(text, "{\"action\":\"CHECK_ONLY\"}");
}

#[tokio::test]
async fn ollama_failure_is_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config(&server), "llama3").unwrap();
    let err = client.complete("sys", "user").await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::Status {
            status: 503,
            body: "model loading".to_string(),
        }
    );
}

#[tokio::test]
async fn ollama_unexpected_body_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config(&server), "llama3").unwrap();
    let err = client.complete("sys", "user").await.unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

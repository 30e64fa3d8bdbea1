use std::sync::{mpsc, Arc};
use std::time::Duration;

use planview_remote::{
    DiagramCall, EventSink, PlanService, RejectionPayload, RemoteError, RemoteEvent, RemoteHandle,
    RemoteSettings, ReqwestPlanService, WireNotification,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> ReqwestPlanService {
    ReqwestPlanService::new(RemoteSettings {
        base_url: server.uri(),
        ..RemoteSettings::default()
    })
    .expect("service")
}

#[tokio::test]
async fn process_posts_content_and_parses_diagram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .and(body_json(json!({ "content": "A\tB\n1\t2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "image": "PHN2Zz48L3N2Zz4=",
            "notifications": [{ "severity": "WARN", "message": "Row 2 ambiguous" }]
        })))
        .mount(&server)
        .await;

    let payload = service_for(&server).process("A\tB\n1\t2").await.expect("ok");
    assert_eq!(payload.image, "PHN2Zz48L3N2Zz4=");
    assert_eq!(
        payload.notifications,
        vec![WireNotification {
            severity: "WARN".to_string(),
            message: "Row 2 ambiguous".to_string(),
        }]
    );
}

#[tokio::test]
async fn process_rejection_keeps_message_and_notifications() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Unknown dependency 'Build'",
            "notifications": [{ "severity": "ERROR", "message": "Row 4" }]
        })))
        .mount(&server)
        .await;

    let err = service_for(&server).process("x").await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Rejected {
            status: 500,
            payload: RejectionPayload {
                message: Some("Unknown dependency 'Build'".to_string()),
                notifications: vec![WireNotification {
                    severity: "ERROR".to_string(),
                    message: "Row 4".to_string(),
                }],
            },
        }
    );
}

#[tokio::test]
async fn rejection_with_unstructured_body_has_empty_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clear-last-selected"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = service_for(&server).clear_selection().await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Rejected {
            status: 502,
            payload: RejectionPayload::default(),
        }
    );
}

#[tokio::test]
async fn descendants_accept_numeric_and_text_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-descendants"))
        .and(body_json(json!({ "node": "3" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "descendants": [3, 7, "x9"] })),
        )
        .mount(&server)
        .await;

    let descendants = service_for(&server).descendants("3").await.expect("ok");
    assert_eq!(descendants, vec!["3", "7", "x9"]);
}

#[tokio::test]
async fn session_cookie_is_sent_back_on_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_json(json!({ "image": "", "notifications": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get-copy-text"))
        .and(header("cookie", "session=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "text": "2024-03-01\t2024-03-04\tana" })),
        )
        .mount(&server)
        .await;

    let service = service_for(&server);
    service.process("x").await.expect("process");
    let text = service.copy_text().await.expect("copy text");
    assert_eq!(text, "2024-03-01\t2024-03-04\tana");
}

#[tokio::test]
async fn malformed_success_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-copy-text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = service_for(&server).copy_text().await.unwrap_err();
    assert!(matches!(err, RemoteError::MalformedBody(_)));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "image": "" })),
        )
        .mount(&server)
        .await;

    let service = ReqwestPlanService::new(RemoteSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..RemoteSettings::default()
    })
    .unwrap();
    let err = service.process("x").await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(_)));
}

#[test]
fn handle_posts_one_event_per_call() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "empty" })))
            .mount(&server)
            .await;
        server
    });

    let (tx, rx) = mpsc::channel::<RemoteEvent>();
    let sink: Arc<dyn EventSink> = Arc::new(tx);
    let handle = RemoteHandle::spawn(Arc::new(service_for(&server)), sink).expect("spawn");
    handle.process("x");

    let event = rx.recv_timeout(Duration::from_secs(5)).expect("event");
    match event {
        RemoteEvent::Diagram { call, result } => {
            assert_eq!(call, DiagramCall::Process);
            assert!(matches!(
                result,
                Err(RemoteError::Rejected { status: 400, .. })
            ));
        }
        other => panic!("unexpected event {other:?}"),
    }
    drop(runtime);
}

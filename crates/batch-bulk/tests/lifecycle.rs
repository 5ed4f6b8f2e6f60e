//! End-to-end lifecycle tests against a scripted HTTP server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sf_batch_bulk::{BatchState, BulkClient, FaultKind, Operation};

fn client_for(server: &MockServer) -> BulkClient {
    BulkClient::new(server.uri(), "test-session")
        .unwrap()
        .with_poll_interval(Duration::from_millis(5))
}

fn job_body(id: &str, operation: &str, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "operation": operation,
        "object": "Account",
        "contentType": "JSON",
        "state": state,
    })
}

fn batch_body(id: &str, job_id: &str, state: &str) -> serde_json::Value {
    json!({ "id": id, "jobId": job_id, "state": state })
}

async fn mount_batch_states(server: &MockServer, job_id: &str, batch_id: &str, states: &[&str]) {
    let status_path = format!("/job/{}/batch/{}", job_id, batch_id);
    let (last, head) = states.split_last().expect("at least one state");
    for state in head {
        Mock::given(method("GET"))
            .and(path(status_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(batch_body(batch_id, job_id, state)),
            )
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_body(batch_id, job_id, last)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn insert_runs_the_lifecycle_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .and(body_json(json!({
            "operation": "insert",
            "object": "Account",
            "contentType": "JSON",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750A", "insert", "Open")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750A/batch"))
        .and(body_json(json!([{"Name": "Acme"}])))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(batch_body("751B", "750A", "Queued")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750A"))
        .and(body_json(json!({"state": "Closed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("750A", "insert", "Closed")))
        .expect(1)
        .mount(&server)
        .await;
    mount_batch_states(&server, "750A", "751B", &["Queued", "Completed"]).await;
    Mock::given(method("GET"))
        .and(path("/job/750A/batch/751B/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"success": true, "created": true, "id": "001x000003DHP0", "errors": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let outcomes = client
        .sobject("Account")
        .insert(&[json!({"Name": "Acme"})])
        .await
        .expect("insert should resolve");

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].success);
    assert_eq!(outcomes[0].id.as_deref(), Some("001x000003DHP0"));

    // One create, one submit, one close, polling to terminal, then the
    // result fetch: exactly this order, nothing interleaved.
    let requests = server.received_requests().await.unwrap();
    let sequence: Vec<(String, String)> = requests
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            ("POST".to_string(), "/job".to_string()),
            ("POST".to_string(), "/job/750A/batch".to_string()),
            ("POST".to_string(), "/job/750A".to_string()),
            ("GET".to_string(), "/job/750A/batch/751B".to_string()),
            ("GET".to_string(), "/job/750A/batch/751B".to_string()),
            ("GET".to_string(), "/job/750A/batch/751B/result".to_string()),
        ]
    );
}

#[tokio::test]
async fn polling_stops_at_first_terminal_state() {
    let server = MockServer::start().await;
    mount_batch_states(&server, "750A", "751B", &["Queued", "InProgress", "Completed"]).await;

    let client = client_for(&server);
    let state = client.wait_for_batch("750A", "751B").await.unwrap();

    assert_eq!(state, BatchState::Completed);
    // Three scripted states, three polls.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn immediately_failed_batch_polls_once() {
    let server = MockServer::start().await;
    mount_batch_states(&server, "750A", "751B", &["Failed"]).await;

    let client = client_for(&server);
    let state = client.wait_for_batch("750A", "751B").await.unwrap();

    assert_eq!(state, BatchState::Failed);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_state_is_not_terminal() {
    let server = MockServer::start().await;
    mount_batch_states(&server, "750A", "751B", &["Throttled", "Not Processed"]).await;

    let client = client_for(&server);
    let state = client.wait_for_batch("750A", "751B").await.unwrap();

    assert_eq!(state, BatchState::NotProcessed);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn max_wait_bounds_the_poll_loop() {
    let server = MockServer::start().await;
    mount_batch_states(&server, "750A", "751B", &["InProgress"]).await;

    let client = client_for(&server).with_max_wait(Duration::from_millis(20));
    let err = client.wait_for_batch("750A", "751B").await.unwrap_err();

    assert!(err.to_string().contains("Timeout"), "got: {err}");
}

#[tokio::test]
async fn upsert_creation_carries_the_external_id_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .and(body_json(json!({
            "operation": "upsert",
            "object": "Account",
            "contentType": "JSON",
            "externalIdFieldName": "Account_Ref__c",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750U", "upsert", "Open")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let job = client
        .create_job("Account", Operation::Upsert, Some("Account_Ref__c"))
        .await
        .unwrap();

    assert_eq!(job.id, "750U");
}

#[tokio::test]
async fn non_upsert_creation_omits_the_external_id_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750D", "delete", "Open")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .create_job("Account", Operation::Delete, Some("ignored"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("externalIdFieldName").is_none());
}

#[tokio::test]
async fn query_submits_raw_text_and_fetches_first_result_set() {
    let server = MockServer::start().await;
    let soql = "SELECT Id, Email FROM Lead";

    Mock::given(method("POST"))
        .and(path("/job"))
        .and(body_partial_json(json!({"operation": "query"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750Q", "query", "Open")))
        .mount(&server)
        .await;
    // The batch body is the query text itself, not a JSON encoding of it.
    Mock::given(method("POST"))
        .and(path("/job/750Q/batch"))
        .and(body_string(soql))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(batch_body("751Q", "750Q", "Queued")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750Q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("750Q", "query", "Closed")))
        .mount(&server)
        .await;
    mount_batch_states(&server, "750Q", "751Q", &["Completed"]).await;
    Mock::given(method("GET"))
        .and(path("/job/750Q/batch/751Q/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["752R00000000001"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/750Q/batch/751Q/result/752R00000000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Id": "00Q1", "Email": "a@example.com"},
            {"Id": "00Q2", "Email": "b@example.com"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rows = client.sobject("Lead").query(soql).await.unwrap();

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Id"], "00Q1");
}

#[tokio::test]
async fn zero_row_query_skips_the_second_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750Q", "query", "Open")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750Q/batch"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(batch_body("751Q", "750Q", "Queued")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750Q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("750Q", "query", "Closed")))
        .mount(&server)
        .await;
    mount_batch_states(&server, "750Q", "751Q", &["Completed"]).await;
    Mock::given(method("GET"))
        .and(path("/job/750Q/batch/751Q/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rows = client
        .sobject("Lead")
        .query("SELECT Id FROM Lead WHERE Email = null")
        .await
        .unwrap();

    assert_eq!(rows, json!([]));
    let fetched_result_set = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .any(|r| r.url.path().contains("/result/"));
    assert!(!fetched_result_set, "no result-set fetch for an empty id list");
}

#[tokio::test]
async fn separator_damaged_result_body_is_repaired() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750A", "update", "Open")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750A/batch"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(batch_body("751B", "750A", "Queued")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("750A", "update", "Closed")))
        .mount(&server)
        .await;
    mount_batch_states(&server, "750A", "751B", &["Completed"]).await;
    // Two outcome records with the separator between them missing.
    let damaged = concat!(
        r#"[{"success":true,"created":false,"id":"001A","errors":[]}"#,
        r#"{"success":true,"created":false,"id":"001B","errors":[]}]"#,
    );
    Mock::given(method("GET"))
        .and(path("/job/750A/batch/751B/result"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(damaged, "application/json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let outcomes = client
        .sobject("Account")
        .update(&[json!({"Id": "001A"}), json!({"Id": "001B"})])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1].id.as_deref(), Some("001B"));
}

#[tokio::test]
async fn failed_batch_still_returns_its_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("750A", "insert", "Open")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750A/batch"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(batch_body("751B", "750A", "Queued")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/750A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("750A", "insert", "Closed")))
        .mount(&server)
        .await;
    mount_batch_states(&server, "750A", "751B", &["Failed"]).await;
    Mock::given(method("GET"))
        .and(path("/job/750A/batch/751B/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"success": false, "created": false, "id": null,
             "errors": [{"statusCode": "REQUIRED_FIELD_MISSING", "message": "missing", "fields": ["Name"]}]}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let outcomes = client
        .sobject("Account")
        .insert(&[json!({})])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].success);
    assert_eq!(
        outcomes[0].errors[0].status_code.as_deref(),
        Some("REQUIRED_FIELD_MISSING")
    );
}

#[tokio::test]
async fn expired_session_ends_the_flow_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!([{"exceptionCode": "InvalidSessionId"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .sobject("Account")
        .insert(&[json!({"Name": "Acme"})])
        .await
        .unwrap_err();

    let fault = err.fault().expect("should carry the classified fault");
    assert_eq!(fault.kind, FaultKind::ExpiredSession);
    assert_eq!(fault.status, 401);

    // Nothing after the failed create.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use rfpdesk_app::{FetchOutcome, RfpStatus};
use rfpdesk_remote::Client;
use rfpdesk_testkit::{RfpFaker, rows_json};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server};

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_owned())
}

fn json_response(body: String, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

#[test]
fn unreachable_host_yields_failed_outcome_with_remediation() {
    let client = Client::new("http://127.0.0.1:1", "anon", Duration::from_millis(50))
        .expect("client should initialize");

    let outcome = client.fetch_rfps();
    assert!(outcome.rfps().is_empty());
    let message = outcome.error().expect("fetch should fail").to_owned();
    assert!(message.contains("check remote.url"), "got {message}");
}

#[test]
fn list_rfps_sends_query_and_credentials() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let mut faker = RfpFaker::new(21);
    let rows = vec![
        faker.rfp_with_status(RfpStatus::Detected),
        faker.rfp_with_status(RfpStatus::Submitted),
    ];
    let body = rows_json(&rows);

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/rest/v1/rfps?select=*&order=created_at.desc"
        );
        assert_eq!(header_value(&request, "apikey").as_deref(), Some("anon-key"));
        assert_eq!(
            header_value(&request, "Authorization").as_deref(),
            Some("Bearer anon-key")
        );
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "anon-key", Duration::from_secs(1))?;
    let fetched = client.list_rfps()?;
    assert_eq!(fetched.len(), 2);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rows_are_reordered_newest_first() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let mut faker = RfpFaker::new(4);
    let mut rows = (0..5).map(|_| faker.rfp()).collect::<Vec<_>>();
    rows.sort_by_key(|rfp| rfp.created_at);
    let body = rows_json(&rows);

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "anon", Duration::from_secs(1))?;
    let outcome = client.fetch_rfps();
    let created = outcome
        .rfps()
        .iter()
        .map(|rfp| rfp.created_at)
        .collect::<Vec<_>>();
    let mut expected = created.clone();
    expected.sort_by(|left, right| right.cmp(left));
    assert_eq!(created.len(), 5);
    assert_eq!(created, expected);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_error_is_cleaned_and_reported() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let body = r#"{"code":"PGRST301","message":"JWT expired","hint":null,"details":null}"#;
        request
            .respond(json_response(body.to_owned(), 401))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "stale", Duration::from_secs(1))?;
    let outcome = client.fetch_rfps();
    assert_eq!(
        outcome,
        FetchOutcome::Failed("server error (401): JWT expired".to_owned())
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_body_is_a_decode_failure() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"not":"an array"}"#.to_owned(), 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "anon", Duration::from_secs(1))?;
    let outcome = client.fetch_rfps();
    let message = outcome.error().expect("decode should fail");
    assert!(message.starts_with("decode rfps rows"), "got {message}");

    handle.join().expect("server thread should join");
    Ok(())
}

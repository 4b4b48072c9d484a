//! Integration tests for calendar operations.

mod common;

use chrono::{Duration, NaiveTime, Utc};
use graphmail_core::{Error, GraphMailClient, Method, NewEvent, model::parse_timestamp};
use serde_json::json;

use common::{MockTransport, StaticTokenSource, USER, event, no_content, not_found, ok, page};

fn graph_time(value: chrono::NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.7f").to_string()
}

#[tokio::test]
async fn test_default_window_covers_today_plus_seven_days() {
    let dir = tempfile::tempdir().unwrap();
    let today = Utc::now().date_naive().and_time(NaiveTime::MIN);

    let inside = (
        graph_time(today + Duration::hours(9)),
        graph_time(today + Duration::hours(10)),
    );
    let yesterday = (
        graph_time(today - Duration::hours(15)),
        graph_time(today - Duration::hours(14)),
    );
    let ends_late = (
        graph_time(today + Duration::days(6) + Duration::hours(23)),
        graph_time(today + Duration::days(7) + Duration::hours(1)),
    );

    let transport = MockTransport::scripted(vec![page(vec![
        event("yesterday", "Old", &yesterday.0, &yesterday.1),
        event("inside", "Standup", &inside.0, &inside.1),
        event("late", "Overnight", &ends_late.0, &ends_late.1),
    ])]);
    let client = common::client(transport.clone(), dir.path()).await;

    let events = client.list_events(None, None, 10).await.unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["inside"]);
    for event in &events {
        assert!(event.start >= today);
        assert!(event.end <= today + Duration::days(7));
    }

    let request = &transport.requests()[0];
    let start = today.format("%Y-%m-%dT%H:%M:%S");
    let end = (today + Duration::days(7)).format("%Y-%m-%dT%H:%M:%S");
    assert_eq!(request.path, format!("{USER}/calendar/events"));
    assert_eq!(
        request.param("$filter").unwrap(),
        format!("start/dateTime ge '{start}' and end/dateTime le '{end}'")
    );
    assert_eq!(request.param("$orderby"), Some("start/dateTime"));
    assert_eq!(request.param("$top"), Some("10"));
    assert!(
        request
            .headers
            .iter()
            .any(|(k, v)| k == "Prefer" && v == "outlook.timezone=\"UTC\"")
    );
}

#[tokio::test]
async fn test_explicit_window() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![page(vec![event(
        "e1",
        "Review",
        "2024-03-04T09:00:00.0000000",
        "2024-03-04T10:00:00.0000000",
    )])]);
    let client = common::client(transport.clone(), dir.path()).await;

    let events = client
        .list_events(
            Some(parse_timestamp("2024-03-04").unwrap()),
            Some(parse_timestamp("2024-03-05").unwrap()),
            5,
        )
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].location, "Room 1");
    assert_eq!(events[0].organizer, "lead@example.com");
    assert_eq!(
        transport.requests()[0].param("$filter"),
        Some("start/dateTime ge '2024-03-04T00:00:00' and end/dateTime le '2024-03-05T00:00:00'")
    );
}

#[tokio::test]
async fn test_inverted_window_is_rejected_without_request() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![]);
    let client = common::client(transport.clone(), dir.path()).await;

    let result = client
        .list_events(
            Some(parse_timestamp("2024-03-05").unwrap()),
            Some(parse_timestamp("2024-03-04").unwrap()),
            5,
        )
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_add_event() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![ok(json!({"id": "AAMkEvent"}))]);
    let client = common::client(transport.clone(), dir.path()).await;

    let event = NewEvent::new(
        "Planning",
        parse_timestamp("2024-03-04 14:00:00").unwrap(),
        parse_timestamp("2024-03-04 15:00:00").unwrap(),
        "Room 2",
    )
    .attendee("a@example.com")
    .body("Agenda");

    let id = client.add_event(&event).await.unwrap();
    assert_eq!(id, "AAMkEvent");

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, format!("{USER}/calendar/events"));
    let body = request.body.as_ref().unwrap();
    assert_eq!(body["subject"], "Planning");
    assert_eq!(body["start"]["dateTime"], "2024-03-04T14:00:00");
    assert_eq!(body["end"]["timeZone"], "UTC");
    assert_eq!(body["attendees"][0]["emailAddress"]["address"], "a@example.com");
    assert_eq!(body["body"]["content"], "Agenda");
}

#[tokio::test]
async fn test_add_event_ending_before_start_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![]);
    let client = common::client(transport.clone(), dir.path()).await;

    let event = NewEvent::new(
        "Backwards",
        parse_timestamp("2024-03-04 15:00:00").unwrap(),
        parse_timestamp("2024-03-04 14:00:00").unwrap(),
        "",
    );
    assert!(matches!(
        client.add_event(&event).await,
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_remove_event() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![ok(json!({"id": "AAMkEvent"})), no_content()]);
    let client = common::client(transport.clone(), dir.path()).await;

    client.remove_event("AAMkEvent").await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[1].method, Method::Delete);
    assert_eq!(requests[1].path, format!("{USER}/calendar/events/AAMkEvent"));
}

#[tokio::test]
async fn test_remove_unknown_event() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![not_found()]);
    let client = common::client(transport.clone(), dir.path()).await;

    assert!(matches!(
        client.remove_event("gone").await,
        Err(Error::NotFound(_))
    ));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_unauthenticated_calendar_operations() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::scripted(vec![]);
    let client = GraphMailClient::authenticate_with(
        common::config(dir.path()),
        StaticTokenSource::failing(),
        transport.clone(),
    )
    .await;

    let event = NewEvent::new(
        "x",
        parse_timestamp("2024-03-04 14:00:00").unwrap(),
        parse_timestamp("2024-03-04 15:00:00").unwrap(),
        "",
    );
    assert!(matches!(
        client.list_events(None, None, 10).await,
        Err(Error::NotAuthenticated)
    ));
    assert!(matches!(client.add_event(&event).await, Err(Error::NotAuthenticated)));
    assert!(matches!(client.remove_event("id").await, Err(Error::NotAuthenticated)));
    assert_eq!(transport.request_count(), 0);
}

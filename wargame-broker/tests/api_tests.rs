//! Integration tests for the broker relay and client

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wargame_broker::{create_router, serve, BrokerClient, BrokerSource, RelayState};
use wargame_core::{CoordPair, GameState, Options};
use wargame_search::{MovePublisher, MoveSource};

fn test_app() -> axum::Router {
    create_router(Arc::new(RelayState::new()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Relay on a loopback port, served from its own runtime thread
fn spawn_relay() -> String {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            serve(listener, Arc::new(RelayState::new())).await.unwrap();
        });
    });
    let addr = rx.recv().unwrap();
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_status_endpoint() {
    let response = test_app().oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_empty_relay_has_null_data() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, json!({"success": true, "data": null}));
}

#[tokio::test]
async fn test_post_is_echoed_and_stored() {
    let app = test_app();
    let mv = json!({"from": {"row": 3, "col": 4}, "to": {"row": 2, "col": 4}, "turn": 1});

    let response = app.clone().oneshot(post(mv.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true, "data": mv}));

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(body_json(response).await["data"], mv);
}

#[tokio::test]
async fn test_latest_post_wins() {
    let app = test_app();
    let first = json!({"from": {"row": 3, "col": 4}, "to": {"row": 2, "col": 4}, "turn": 1});
    let second = json!({"from": {"row": 1, "col": 0}, "to": {"row": 1, "col": 1}, "turn": 2});

    app.clone().oneshot(post(first)).await.unwrap();
    app.clone().oneshot(post(second.clone())).await.unwrap();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(body_json(response).await["data"], second);
}

#[tokio::test]
async fn test_malformed_move_is_refused() {
    let response = test_app()
        .oneshot(post(json!({"from": "A0", "turn": 1})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[test]
fn test_client_round_trip_through_relay() {
    let url = spawn_relay();
    let client = BrokerClient::new(url).unwrap();
    let pair = CoordPair::from_quad(3, 4, 2, 4);

    assert_eq!(client.fetch_move(1).unwrap(), None);
    client.post_move(pair, 1).unwrap();
    assert_eq!(client.fetch_move(1).unwrap(), Some(pair));
    // Wrong turn means the opponent has not moved yet
    assert_eq!(client.fetch_move(2).unwrap(), None);
}

#[test]
fn test_broker_source_waits_for_the_next_turn() {
    let url = spawn_relay();
    let mut publisher = BrokerClient::new(url.clone()).unwrap();
    let state = GameState::new(Options::default());
    let pair = CoordPair::from_quad(2, 4, 1, 4);

    let mut source =
        BrokerSource::new(BrokerClient::new(url).unwrap()).with_poll_interval(Duration::from_millis(10));
    assert_eq!(source.poll(1), None);

    publisher.publish(pair, 1);
    assert_eq!(source.next_move(&state).unwrap(), pair);

    // A rejected move is not handed out again
    source.reject(pair, "Not your unit!");
    assert_eq!(source.poll(1), None);
}

#[test]
fn test_unreachable_broker_is_an_error() {
    let client = BrokerClient::new("http://127.0.0.1:9/").unwrap();
    assert!(client.fetch_move(1).is_err());

    let source = BrokerSource::new(client);
    assert_eq!(source.poll(1), None);
}

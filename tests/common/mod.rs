//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use axum::{body::Body, http::{Request, StatusCode}, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Four components and three colors, in a fixed order.
pub fn office_look() -> Value {
    json!({
        "title": "Quiet Authority",
        "colorPalette": { "name": "Slate & Sand", "colors": ["#2F3E46", "#CAD2C5", "#E9C46A"] },
        "components": [
            { "item": "Oxford shirt", "description": "Crisp white cotton", "category": "top" },
            { "item": "Wool trousers", "description": "Charcoal, tapered", "category": "bottom" },
            { "item": "Unstructured blazer", "description": "Navy hopsack", "category": "outerwear" },
            { "item": "Derby shoes", "description": "Dark brown leather", "category": "footwear" }
        ],
        "stylePsychology": "Muted tones read as calm competence."
    })
}

/// Wraps model text the way `generateContent` returns it.
pub fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

pub async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Polls the session until its panel is no longer `loading`.
pub async fn settle(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let (_, view) = send(app, "GET", &format!("/api/sessions/{id}"), None).await;
        if view["panel"]["kind"] != "loading" {
            return view;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("session {id} never left the loading state");
}

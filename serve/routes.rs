use std::io::Cursor;

use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn content_type(value: &[u8]) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value).expect("static header is valid")
}

pub fn json_response(status: u16, body: &Value) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.to_string().into_bytes();
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![content_type(b"application/json")],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn error_response(status: u16, message: impl std::fmt::Display) -> Response<Cursor<Vec<u8>>> {
    json_response(status, &json!({ "error": message.to_string() }))
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = b"404 Not Found".to_vec();
    let len = body.len();
    Response::new(
        StatusCode(404),
        vec![content_type(b"text/plain")],
        Cursor::new(body),
        Some(len),
        None,
    )
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = url.split('?').next().unwrap_or("").to_owned();

    let response = match (method, path.as_str()) {
        (Method::Get, "/health") => handlers::health(&state),
        (Method::Post, "/process") => handlers::process(&mut request, &state),
        (Method::Post, "/parameters") => handlers::parameters(&mut request, &state),
        _ => not_found(),
    };

    let _ = request.respond(response);
}

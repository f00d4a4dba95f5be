use std::io::Cursor;

use serde_json::{json, Value};
use tiny_http::{Request, Response};
use tracing::{error, info};

use crate::routes::{error_response, json_response};
use crate::state::{lock, SharedState};

fn read_json(request: &mut Request) -> Result<Value, String> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| format!("cannot read request body: {}", e))?;
    serde_json::from_str(&body).map_err(|e| format!("body is not valid JSON: {}", e))
}

pub fn health(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(state);
    json_response(
        200,
        &json!({
            "status": "ok",
            "entrypoint": st.entrypoint.name(),
            "processed": st.processed,
            "failed": st.failed,
        }),
    )
}

/// Failures are logged and answered with 422 and `{"error": ...}`.
pub fn process(request: &mut Request, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let payload = match read_json(request) {
        Ok(v) => v,
        Err(reason) => return error_response(400, reason),
    };

    let mut st = lock(state);
    let outcome = st.entrypoint.process_input(&payload);
    match outcome {
        Ok(result) => {
            st.processed += 1;
            json_response(200, &result)
        }
        Err(e) => {
            st.failed += 1;
            error!(entrypoint = st.entrypoint.name(), "exception when processing input: {}", e);
            error_response(422, e)
        }
    }
}

pub fn parameters(request: &mut Request, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let params = match read_json(request) {
        Ok(v) => v,
        Err(reason) => return error_response(400, reason),
    };

    let mut st = lock(state);
    let outcome = st.entrypoint.update_parameters(&params);
    match outcome {
        Ok(()) => {
            info!(entrypoint = st.entrypoint.name(), %params, "parameters updated");
            json_response(200, &json!({ "status": "updated" }))
        }
        Err(e) => error_response(422, e),
    }
}

use gradecalcd::CalcError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn calc_err(id: &str, e: CalcError) -> serde_json::Value {
    tracing::debug!(id, code = %e.code, message = %e.message, "request rejected");
    err(id, &e.code, e.message, e.details)
}

/// Reply for a line that could not be parsed far enough to find its id.
pub fn err_without_id(code: &str, message: impl Into<String>) -> serde_json::Value {
    json!({
        "id": serde_json::Value::Null,
        "ok": false,
        "error": {
            "code": code,
            "message": message.into(),
        },
    })
}

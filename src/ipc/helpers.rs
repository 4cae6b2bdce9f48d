use super::error::err;
use super::types::Request;
use gradecalcd::gpa::SemesterFilter;
use gradecalcd::records::{ScoreRecord, StudentInfo};
use serde::de::DeserializeOwned;
use serde_json::json;

pub fn required_f64(req: &Request, key: &str) -> Result<f64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> String {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Deserialize `params[key]` as `T`, reporting the key on failure.
pub fn required_as<T: DeserializeOwned>(req: &Request, key: &str) -> Result<T, serde_json::Value> {
    let Some(raw) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    serde_json::from_value(raw.clone()).map_err(|e| {
        err(
            &req.id,
            "bad_params",
            format!("{} is malformed: {}", key, e),
            Some(json!({ "key": key })),
        )
    })
}

pub fn records(req: &Request) -> Result<Vec<ScoreRecord>, serde_json::Value> {
    required_as(req, "records")
}

/// Roster is optional; missing means "no names known".
pub fn students(req: &Request) -> Result<Vec<StudentInfo>, serde_json::Value> {
    match req.params.get("students") {
        None => Ok(Vec::new()),
        Some(v) if v.is_null() => Ok(Vec::new()),
        Some(_) => required_as(req, "students"),
    }
}

/// `semester` may be absent, null, "all"/"ALL", or an integer 1..=8.
pub fn semester_filter(req: &Request) -> Result<SemesterFilter, serde_json::Value> {
    match req.params.get("semester") {
        None => Ok(SemesterFilter::All),
        Some(v) if v.is_null() => Ok(SemesterFilter::All),
        Some(v)
            if v.as_str()
                .map(|s| s.eq_ignore_ascii_case("all"))
                .unwrap_or(false) =>
        {
            Ok(SemesterFilter::All)
        }
        Some(v) => match v.as_u64() {
            Some(n) if (1..=8).contains(&n) => Ok(SemesterFilter::Only(n as u8)),
            _ => Err(err(
                &req.id,
                "bad_params",
                "semester must be an integer 1-8 or 'all'",
                Some(json!({ "semester": v })),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(params: serde_json::Value) -> Request {
        Request {
            id: "t".into(),
            method: "test".into(),
            params,
        }
    }

    #[test]
    fn semester_filter_accepts_all_and_numbers() {
        assert_eq!(semester_filter(&req(json!({}))).ok(), Some(SemesterFilter::All));
        assert_eq!(
            semester_filter(&req(json!({ "semester": "ALL" }))).ok(),
            Some(SemesterFilter::All)
        );
        assert_eq!(
            semester_filter(&req(json!({ "semester": 4 }))).ok(),
            Some(SemesterFilter::Only(4))
        );
        assert!(semester_filter(&req(json!({ "semester": 9 }))).is_err());
        assert!(semester_filter(&req(json!({ "semester": "spring" }))).is_err());
    }

    #[test]
    fn missing_roster_is_empty() {
        assert!(students(&req(json!({}))).expect("roster").is_empty());
        assert!(students(&req(json!({ "students": 3 }))).is_err());
    }
}

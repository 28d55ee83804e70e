//! Purpose: Define a stable, structured schema for non-fatal job data diagnostics.
//! Exports: `Notice`, `notice_json`, `notice_time_now`, `NoticeSink`, and stock sinks.
//! Role: Lets operators tell "no job data present" apart from "job data broken".
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: A notice is emitted before the corresponding error or fallback is returned.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value, json};

pub const KIND_MISSING_JOB_DATA: &str = "missing_job_data";
pub const KIND_FALLBACK: &str = "fallback";
pub const KIND_PARAM_FALLBACK: &str = "param_fallback";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub op: String,
    pub path: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("op".to_string(), json!(notice.op));
    inner.insert("path".to_string(), json!(notice.path));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

/// Destination for notices raised while reading job data.
pub trait NoticeSink: Send + Sync {
    fn emit(&self, notice: &Notice);
}

/// Writes each notice as one JSON line on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrNotices;

impl NoticeSink for StderrNotices {
    fn emit(&self, notice: &Notice) {
        let json = serde_json::to_string(&notice_json(notice)).unwrap_or_else(|_| {
            "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
        });
        eprintln!("{json}");
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNotices;

impl NoticeSink for SilentNotices {
    fn emit(&self, _notice: &Notice) {}
}

/// Keeps notices in memory; useful when the embedding process owns its own reporting.
#[derive(Debug, Default)]
pub struct CollectNotices {
    notices: Mutex<Vec<Notice>>,
}

impl CollectNotices {
    pub fn take(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl NoticeSink for CollectNotices {
    fn emit(&self, notice: &Notice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice.clone()),
            Err(poisoned) => poisoned.into_inner().push(notice.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectNotices, Notice, NoticeSink, notice_json, notice_time_now};
    use serde_json::{Map, Value};

    fn sample() -> Notice {
        let mut details = Map::new();
        details.insert("param".to_string(), Value::from("start_date"));

        Notice {
            kind: "fallback".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            op: "get_param".to_string(),
            path: "/input/data.json".to_string(),
            message: "no job data file found, using fallback value".to_string(),
            details,
        }
    }

    #[test]
    fn notice_json_has_required_fields() {
        let value = notice_json(&sample());
        let obj = value
            .get("notice")
            .and_then(|v| v.as_object())
            .expect("notice object");

        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("fallback"));
        assert_eq!(
            obj.get("time").and_then(|v| v.as_str()),
            Some("2026-02-01T00:00:00Z")
        );
        assert_eq!(obj.get("op").and_then(|v| v.as_str()), Some("get_param"));
        assert_eq!(
            obj.get("path").and_then(|v| v.as_str()),
            Some("/input/data.json")
        );
        assert!(obj.get("details").and_then(|v| v.as_object()).is_some());
    }

    #[test]
    fn collect_sink_drains_in_order() {
        let sink = CollectNotices::default();
        let first = sample();
        let mut second = sample();
        second.kind = "param_fallback".to_string();

        sink.emit(&first);
        sink.emit(&second);

        let taken = sink.take();
        assert_eq!(taken, vec![first, second]);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn notice_time_is_rfc3339() {
        let time = notice_time_now().expect("time");
        assert!(time.contains('T'));
        assert!(time.ends_with('Z'));
    }
}

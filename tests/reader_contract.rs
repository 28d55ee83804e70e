// Reader contract tests: job data present, absent, and malformed.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use r5t_worker_sdk::api::{
    self, CollectNotices, ErrorKind, JobConfigReader, MissingParamPolicy, SilentNotices,
};
use serde_json::{Value, json};

fn write_data(temp: &tempfile::TempDir, text: &str) -> PathBuf {
    let path = temp.path().join("data.json");
    std::fs::write(&path, text).expect("write data");
    path
}

fn quiet(path: &Path) -> JobConfigReader {
    JobConfigReader::new()
        .with_path(path)
        .with_notice_sink(Arc::new(SilentNotices))
}

#[test]
fn present_file_yields_job_id_and_param() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(&temp, r#"{"job_id": "abc123", "params": {"start_date": 2020}}"#);

    assert_eq!(api::job_id(&path).unwrap(), "abc123");
    assert_eq!(api::get_param("start_date", 2000, &path).unwrap(), 2020);
    assert_eq!(
        api::get_param_value("start_date", json!("ignored"), &path).unwrap(),
        json!(2020)
    );
}

#[test]
fn params_of_every_json_type_round_trip() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(
        &temp,
        r#"{"job_id":"j","params":{"s":"x","n":1.5,"b":true,"a":[1,2],"o":{"k":"v"},"z":null}}"#,
    );
    let reader = quiet(&path);

    assert_eq!(reader.get_param("s", String::new()).unwrap(), "x");
    assert_eq!(reader.get_param("n", 0.0_f64).unwrap(), 1.5);
    assert!(reader.get_param("b", false).unwrap());
    assert_eq!(reader.get_param("a", Vec::<i64>::new()).unwrap(), vec![1, 2]);
    assert_eq!(
        reader.param_value("o", Value::Null).unwrap(),
        json!({"k": "v"})
    );
    // An explicit null is a present value, not an absent key.
    assert_eq!(reader.param_value("z", json!(7)).unwrap(), Value::Null);
    assert_eq!(reader.get_param::<Option<i64>>("z", Some(7)).unwrap(), None);
}

#[test]
fn absent_key_is_an_error_by_default() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(&temp, r#"{"job_id": "abc123", "params": {}}"#);

    let err = api::get_param("start_date", 2000, &path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingParam);
    assert_eq!(err.field(), Some("params.start_date"));
}

#[test]
fn absent_key_falls_back_when_opted_in() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(&temp, r#"{"job_id": "abc123", "params": {}}"#);
    let reader = quiet(&path).with_missing_param_policy(MissingParamPolicy::Fallback);

    assert_eq!(reader.get_param("start_date", 2000).unwrap(), 2000);
}

#[test]
fn missing_file_fails_job_id_but_falls_back_for_params() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("absent.json");
    let sink = Arc::new(CollectNotices::default());
    let reader = JobConfigReader::new()
        .with_path(&path)
        .with_notice_sink(sink.clone());

    let err = reader.job_id().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.path(), Some(path.as_path()));

    assert_eq!(reader.get_param("start_date", 2000).unwrap(), 2000);

    let kinds: Vec<String> = sink.take().into_iter().map(|notice| notice.kind).collect();
    assert_eq!(kinds, vec!["missing_job_data", "fallback"]);
}

#[test]
fn missing_file_falls_back_even_under_error_policy() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("absent.json");
    let reader = quiet(&path).with_missing_param_policy(MissingParamPolicy::Error);

    assert_eq!(reader.param_value("x", json!("dflt")).unwrap(), json!("dflt"));
    assert_eq!(reader.load().unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn malformed_file_never_falls_back() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(&temp, "{ this is not json");
    let reader = quiet(&path).with_missing_param_policy(MissingParamPolicy::Fallback);

    assert_eq!(reader.job_id().unwrap_err().kind(), ErrorKind::Parse);
    let err = reader.get_param("start_date", 2000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.line().is_some());
}

#[test]
fn missing_job_id_is_missing_field() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(&temp, r#"{"params": {"x": 1}}"#);

    let err = api::job_id(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert_eq!(err.field(), Some("job_id"));
    // Params stay readable without a job id.
    assert_eq!(api::get_param("x", 0, &path).unwrap(), 1);
}

#[test]
fn directory_path_is_not_masked() {
    let temp = tempfile::tempdir().expect("tempdir");
    let reader = quiet(temp.path());

    let err = reader.get_param("x", 0).unwrap_err();
    assert_ne!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn repeated_reads_are_stable_and_leave_file_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    let text = r#"{"job_id": "abc123", "params": {"start_date": 2020}}"#;
    let path = write_data(&temp, text);
    let reader = quiet(&path);

    let first = reader.load().unwrap();
    let second = reader.load().unwrap();
    assert_eq!(first, second);
    assert_eq!(reader.job_id().unwrap(), reader.job_id().unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn rewrites_are_visible_to_the_next_call() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_data(&temp, r#"{"job_id": "first"}"#);
    let reader = quiet(&path);
    assert_eq!(reader.job_id().unwrap(), "first");

    std::fs::write(&path, r#"{"job_id": "second"}"#).unwrap();
    assert_eq!(reader.job_id().unwrap(), "second");
}

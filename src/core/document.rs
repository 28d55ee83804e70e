//! Purpose: Parse a job data file and expose lazy accessors for `job_id` and `params`.
//! Exports: `JobDocument`, `JobConfig`, `JOB_ID_FIELD`, `PARAMS_FIELD`.
//! Role: The only place that reads job data bytes from disk and maps parse failures.
//! Invariants: Each `read` performs exactly one file read; nothing is cached between reads.
//! Invariants: The file is opened read-only and never written.
//! Invariants: `param` lookups do not require `job_id` to be present.
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind, map_io_error_kind};
use crate::json::parse;

pub const JOB_ID_FIELD: &str = "job_id";
pub const PARAMS_FIELD: &str = "params";

#[derive(Clone, Debug, PartialEq)]
pub struct JobDocument {
    path: PathBuf,
    root: Map<String, Value>,
}

impl JobDocument {
    pub fn read(path: &Path) -> Result<Self, Error> {
        tracing::debug!(path = %path.display(), "reading job data file");
        let bytes = std::fs::read(path).map_err(|err| {
            Error::new(map_io_error_kind(&err))
                .with_message("failed to read job data file")
                .with_path(path)
                .with_source(err)
        })?;
        Self::from_slice(&bytes, path)
    }

    pub fn from_slice(bytes: &[u8], path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let value: Value = parse::from_slice(bytes).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("job data file is not valid JSON")
                .with_hint(parse::hint_for_error(&err, "job data file"))
                .with_path(&path)
                .with_position(err.line(), err.column())
                .with_source(err)
        })?;
        match value {
            Value::Object(root) => Ok(Self { path, root }),
            other => Err(Error::new(ErrorKind::Parse)
                .with_message(format!(
                    "job data file must contain a JSON object, found {}",
                    value_type_name(&other)
                ))
                .with_path(&path)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn job_id(&self) -> Result<&str, Error> {
        match self.root.get(JOB_ID_FIELD) {
            Some(Value::String(job_id)) => Ok(job_id),
            Some(other) => Err(Error::new(ErrorKind::TypeMismatch)
                .with_message(format!(
                    "job_id must be a string, found {}",
                    value_type_name(other)
                ))
                .with_field(JOB_ID_FIELD)
                .with_path(&self.path)),
            None => Err(Error::new(ErrorKind::MissingField)
                .with_message("job data file has no job_id")
                .with_hint("The orchestrator writes job_id before starting the worker.")
                .with_field(JOB_ID_FIELD)
                .with_path(&self.path)),
        }
    }

    /// Returns `Ok(None)` when the document has no `params` object at all.
    pub fn params(&self) -> Result<Option<&Map<String, Value>>, Error> {
        match self.root.get(PARAMS_FIELD) {
            Some(Value::Object(params)) => Ok(Some(params)),
            Some(other) => Err(Error::new(ErrorKind::TypeMismatch)
                .with_message(format!(
                    "params must be a JSON object, found {}",
                    value_type_name(other)
                ))
                .with_field(PARAMS_FIELD)
                .with_path(&self.path)),
            None => Ok(None),
        }
    }

    pub fn param(&self, name: &str) -> Result<Option<&Value>, Error> {
        Ok(self.params()?.and_then(|params| params.get(name)))
    }

    pub fn to_config(&self) -> Result<JobConfig, Error> {
        let job_id = self.job_id()?.to_string();
        let params = self.params()?.cloned().unwrap_or_default();
        Ok(JobConfig { job_id, params })
    }
}

/// Fully-validated job data: a string `job_id` and a (possibly empty) params object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub job_id: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl fmt::Display for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "job_id: {}", self.job_id)?;
        writeln!(f, "params:")?;
        // Sorted for stable human output; the on-disk order carries no meaning.
        let sorted: BTreeMap<&String, &Value> = self.params.iter().collect();
        for (key, value) in sorted {
            writeln!(f, "  {key}: {value}")?;
        }
        Ok(())
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

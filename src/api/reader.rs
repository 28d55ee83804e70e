//! Purpose: Define the public reader for a worker's job data file.
//! Exports: `JobConfigReader`, `MissingParamPolicy`, `DEFAULT_DATA_PATH`, one-shot helpers.
//! Role: Stable boundary for worker code and the CLI; owns the fallback policy.
//! Invariants: A missing file is masked into `fallback` only by param lookups.
//! Invariants: Malformed content is always surfaced, never replaced by a fallback.
//! Invariants: Every call re-reads the file; the reader holds no cached document.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::document::{JobConfig, JobDocument, PARAMS_FIELD};
use crate::core::error::{Error, ErrorKind};
use crate::notice::{
    KIND_FALLBACK, KIND_MISSING_JOB_DATA, KIND_PARAM_FALLBACK, Notice, NoticeSink, StderrNotices,
    notice_time_now,
};

pub type ApiResult<T> = Result<T, Error>;

/// Where the orchestrator mounts job data inside a worker container.
pub const DEFAULT_DATA_PATH: &str = "/input/data.json";

/// What a param lookup does when the file parses but the key (or `params`) is absent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MissingParamPolicy {
    #[default]
    Error,
    Fallback,
}

#[derive(Clone)]
pub struct JobConfigReader {
    path: PathBuf,
    missing_param: MissingParamPolicy,
    notices: Arc<dyn NoticeSink>,
}

impl JobConfigReader {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            missing_param: MissingParamPolicy::default(),
            notices: Arc::new(StderrNotices),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_missing_param_policy(mut self, policy: MissingParamPolicy) -> Self {
        self.missing_param = policy;
        self
    }

    pub fn with_notice_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn missing_param_policy(&self) -> MissingParamPolicy {
        self.missing_param
    }

    pub fn job_id(&self) -> ApiResult<String> {
        let document = self.read("job_id").map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                self.notify(
                    KIND_MISSING_JOB_DATA,
                    "job_id",
                    "provided data path did not contain an r5t data file",
                    Map::new(),
                );
                err.with_hint("Pass --data or check that the orchestrator mounted the job data.")
            } else {
                err
            }
        })?;
        Ok(document.job_id()?.to_string())
    }

    /// Untyped lookup: the returned value's type is not checked against `fallback`.
    pub fn param_value(&self, name: &str, fallback: Value) -> ApiResult<Value> {
        self.lookup(name, fallback, |value| Ok(value.clone()))
    }

    pub fn get_param<T: DeserializeOwned>(&self, name: &str, fallback: T) -> ApiResult<T> {
        self.lookup(name, fallback, |value| {
            serde_json::from_value(value.clone()).map_err(|err| {
                Error::new(ErrorKind::TypeMismatch)
                    .with_message(format!("param {name} has an unexpected type"))
                    .with_field(format!("{PARAMS_FIELD}.{name}"))
                    .with_path(&self.path)
                    .with_source(err)
            })
        })
    }

    pub fn load(&self) -> ApiResult<JobConfig> {
        self.read("load")?.to_config()
    }

    fn lookup<T>(
        &self,
        name: &str,
        fallback: T,
        convert: impl FnOnce(&Value) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let document = match self.read("get_param") {
            Ok(document) => document,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.notify(
                    KIND_FALLBACK,
                    "get_param",
                    "no r5t data file found, using fallback value",
                    param_details(name),
                );
                return Ok(fallback);
            }
            Err(err) => return Err(err),
        };

        match document.param(name)? {
            Some(value) => convert(value),
            None => match self.missing_param {
                MissingParamPolicy::Error => Err(missing_param_error(&document, name)?),
                MissingParamPolicy::Fallback => {
                    self.notify(
                        KIND_PARAM_FALLBACK,
                        "get_param",
                        "param not set in r5t data file, using fallback value",
                        param_details(name),
                    );
                    Ok(fallback)
                }
            },
        }
    }

    fn read(&self, op: &str) -> ApiResult<JobDocument> {
        let result = JobDocument::read(&self.path);
        if let Err(err) = &result {
            tracing::debug!(op, path = %self.path.display(), kind = ?err.kind(), "job data read failed");
        }
        result
    }

    fn notify(&self, kind: &str, op: &str, message: &str, details: Map<String, Value>) {
        let notice = Notice {
            kind: kind.to_string(),
            time: notice_time_now().unwrap_or_default(),
            op: op.to_string(),
            path: self.path.display().to_string(),
            message: message.to_string(),
            details,
        };
        self.notices.emit(&notice);
    }
}

impl Default for JobConfigReader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JobConfigReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobConfigReader")
            .field("path", &self.path)
            .field("missing_param", &self.missing_param)
            .finish_non_exhaustive()
    }
}

fn param_details(name: &str) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert("param".to_string(), Value::from(name));
    details
}

// Distinguishes "no params object" from "params present, key absent" in the message.
fn missing_param_error(document: &JobDocument, name: &str) -> ApiResult<Error> {
    let message = if document.params()?.is_some() {
        format!("param {name} is not set in job data file")
    } else {
        format!("job data file has no params object (looking up {name})")
    };
    Ok(Error::new(ErrorKind::MissingParam)
        .with_message(message)
        .with_field(format!("{PARAMS_FIELD}.{name}"))
        .with_path(document.path()))
}

/// Reads the job id from `path`, failing with `NotFound` when the file is absent.
pub fn job_id(path: impl AsRef<Path>) -> ApiResult<String> {
    JobConfigReader::new().with_path(path.as_ref()).job_id()
}

/// Reads `params[name]` from `path`, returning `fallback` when the file is absent.
pub fn get_param<T: DeserializeOwned>(
    name: &str,
    fallback: T,
    path: impl AsRef<Path>,
) -> ApiResult<T> {
    JobConfigReader::new()
        .with_path(path.as_ref())
        .get_param(name, fallback)
}

pub fn get_param_value(name: &str, fallback: Value, path: impl AsRef<Path>) -> ApiResult<Value> {
    JobConfigReader::new()
        .with_path(path.as_ref())
        .param_value(name, fallback)
}

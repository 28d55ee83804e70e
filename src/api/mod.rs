//! Purpose: Define the stable public Rust API boundary for worker job data.
//! Exports: Reader, one-shot helpers, document types, and the error model.
//! Role: Public, additive-only surface used by worker code and the CLI.
//! Invariants: This module is the only public path worker code needs.

mod reader;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::document::{JobConfig, JobDocument};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::notice::{CollectNotices, Notice, NoticeSink, SilentNotices, StderrNotices};
pub use reader::{
    ApiResult, DEFAULT_DATA_PATH, JobConfigReader, MissingParamPolicy, get_param, get_param_value,
    job_id,
};

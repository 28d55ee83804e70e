//! Purpose: Worker-side SDK for reading r5t job data files.
//! Exports: `api` (reader and one-shot helpers), `core` (document and errors), `notice`.
//! Role: Library backing worker processes and the `r5t-job` CLI.
//! Invariants: Every read re-opens the job data file; no process-wide mutable state.
//! Invariants: A missing file is only ever masked by `get_param`-style lookups.
pub mod api;
pub mod core;
mod json;
pub mod notice;

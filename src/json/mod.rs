//! Purpose: Internal JSON parsing boundary for job data files.
//! Exports: `parse` module with decode and failure-categorization helpers.
//! Role: Single seam for the parser so the reader avoids ad hoc decode logic.
//! Invariants: Job data decoding goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;

// Core modules implementing job data decoding and error modeling.
pub mod document;
pub mod error;

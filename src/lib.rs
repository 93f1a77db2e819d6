#![allow(clippy::doc_lazy_continuation)]
#![allow(clippy::needless_return)]
// src/lib.rs

// Scam message detection pipeline
pub mod scam_detection;

// Logging bootstrap for embedding callers
pub mod logging;

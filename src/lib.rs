// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests and benches can import types via `quillsheet::topic::*` /
// `quillsheet::lesson::*`. The terminal front-end is only driven by the binary,
// so suppress dead_code warnings for it here.
#![allow(dead_code)]

pub mod api;
pub mod config;
pub mod form;
pub mod history;
pub mod lesson;
pub mod store;
pub mod topic;

// Private: the terminal front-end, not part of the library API
mod app;
mod event;
mod ui;

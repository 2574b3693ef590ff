//! Browser (`wasm32`) implementations of [`ui_state_host`] service contracts.
//!
//! This crate is the concrete browser-side wiring layer for the notification
//! host services: `sessionStorage`/`localStorage` persistence and
//! `setTimeout`-based expiry timers. On non-wasm targets every adapter is
//! inert, which keeps downstream crates compilable for native test runs.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod timers;

pub use storage::{StorageArea, WebStorageStore};
pub use timers::WebScheduler;

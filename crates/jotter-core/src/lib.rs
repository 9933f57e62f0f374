//! Jotter Core Library
//!
//! Synchronous application core: the state store, its derived queries,
//! and best-effort persistence. No async runtime, pure logic only.
//!

pub mod config;
pub mod engine;
pub mod model;
pub mod persist;
pub mod storage;
pub mod store;
pub mod utils;

pub use config::JotterConfig;
pub use engine::JotterEngine;
pub use model::{Note, NoteDraft, NotePatch, Theme, User};
pub use store::Store;

//! Test doubles for deterministic session tests.

mod scripted;

pub use scripted::ScriptedBackend;

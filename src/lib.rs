// src/lib.rs
// gomoku-arena: per-session orchestration of an external rules engine and AI

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod protocol;
pub mod session;
pub mod spawner;
pub mod web;

pub use error::{ArenaError, Result};
pub use orchestrator::Arena;

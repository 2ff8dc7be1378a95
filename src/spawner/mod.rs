//! Child process layer
//!
//! Spawns the rules engine and AI executables and moves text across their
//! pipes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Session                      │
//! │  • apply_move() holds the session mutex       │
//! └──────────────────────────────────────────────┘
//!          │ request(line)            │ stderr
//!          ▼                          ▼
//! ┌──────────────────┐      ┌──────────────────────┐
//! │   ChildHandle     │      │      LogRelay         │
//! │  • write line     │      │  • read_until '\n'    │
//! │  • read one line  │      │  • trim, skip blank   │
//! │  • bounded wait   │      │  • broadcast::send    │
//! └──────────────────┘      └──────────────────────┘
//!          │                          │
//!          ▼                          ▼
//!   engine / ai executable     session log channel
//! ```

mod process;
mod stream;
pub mod types;

pub use process::ChildHandle;
pub use stream::LogRelay;
pub use types::{ChildRole, LogEvent, ProgramSpec};

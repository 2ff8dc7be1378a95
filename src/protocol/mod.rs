//! Line protocols spoken by the rules engine and the AI opponent
//!
//! Both children read one newline-terminated ASCII request from stdin and
//! answer with exactly one line on stdout. The codecs here only build and
//! parse those lines; the trailing newline is added by the process handle.
//!
//! ```text
//! engine:  "<index> <marker>"  ->  "0" (continue) | "1" (win) | anything else (invalid)
//! ai:      "<index>"           ->  "<chosen index>"
//! ```

pub mod ai;
pub mod engine;

use serde::{Deserialize, Serialize};

/// Opponent index meaning "no prior move": the AI opens the game.
pub const AI_MOVES_FIRST: i32 = -1;

/// One of the two seats at the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    /// The remote client, marker 1
    #[serde(rename = "X")]
    One,
    /// The AI executable, marker 2
    #[serde(rename = "O")]
    Two,
}

impl Player {
    /// Marker written to the engine for this player
    pub fn marker(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

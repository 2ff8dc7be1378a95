// src/protocol/ai.rs
// Codec for the AI opponent: last opponent move in, chosen index out

use crate::error::{ArenaError, Result};

/// Build the request line carrying the opponent's last move
/// (or [`super::AI_MOVES_FIRST`])
pub fn encode_last_move(index: i32) -> String {
    index.to_string()
}

/// Parse the AI's chosen position.
///
/// A non-integer reply means the AI broke its contract, so it surfaces as a
/// protocol error rather than a client-facing invalid move.
pub fn decode_choice(line: &str) -> Result<i32> {
    let trimmed = line.trim();
    trimmed
        .parse::<i32>()
        .map_err(|_| ArenaError::protocol(format!("AI replied with non-integer move {trimmed:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AI_MOVES_FIRST;

    #[test]
    fn test_encode_sentinel() {
        assert_eq!(encode_last_move(AI_MOVES_FIRST), "-1");
        assert_eq!(encode_last_move(57), "57");
    }

    #[test]
    fn test_decode_choice() {
        assert_eq!(decode_choice("189\n").unwrap(), 189);
        assert_eq!(decode_choice(" 7 ").unwrap(), 7);
    }

    #[test]
    fn test_decode_garbage_is_protocol_error() {
        let err = decode_choice("resign").unwrap_err();
        assert_eq!(err.kind(), "protocol_error");
        assert!(decode_choice("").is_err());
    }
}

// src/protocol/engine.rs
// Codec for the rules engine: "<index> <marker>" in, status code out

use super::Player;

/// Status reported by the engine for one placed stone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineReply {
    /// Move accepted, no winner yet
    Continue,
    /// Move accepted and the mover completed a line
    Win,
    /// Engine rejected the move, or replied with something unparseable
    Invalid,
}

/// Build the request line for placing `player`'s stone at `index`
pub fn encode_move(index: i32, player: Player) -> String {
    format!("{} {}", index, player.marker())
}

/// Interpret the engine's reply line
pub fn decode_reply(line: &str) -> EngineReply {
    match line.trim().parse::<i64>() {
        Ok(0) => EngineReply::Continue,
        Ok(1) => EngineReply::Win,
        _ => EngineReply::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_move() {
        assert_eq!(encode_move(210, Player::One), "210 1");
        assert_eq!(encode_move(0, Player::Two), "0 2");
    }

    #[test]
    fn test_decode_known_codes() {
        assert_eq!(decode_reply("0"), EngineReply::Continue);
        assert_eq!(decode_reply("1\r\n"), EngineReply::Win);
        assert_eq!(decode_reply("  1 "), EngineReply::Win);
    }

    #[test]
    fn test_decode_everything_else_is_invalid() {
        for line in ["-1", "2", "", "win", "1.0", "0 0"] {
            assert_eq!(decode_reply(line), EngineReply::Invalid, "line {line:?}");
        }
    }
}

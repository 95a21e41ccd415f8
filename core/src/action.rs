use serde::{Deserialize, Serialize};

use crate::*;

/// Everything the UI layer may ask the state machine to do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetMode {
        mode: Mode,
    },
    /// Casual difficulty; competitive games take theirs from the rank.
    SetLevel {
        level: Difficulty,
    },
    NewGame,
    OpenField {
        row: Coord,
        column: Coord,
    },
    /// Toggles the flag on a closed field.
    SelectField {
        row: Coord,
        column: Coord,
    },
    GameOverTimeUp,
    LosePointForExit,
    ToggleGameOver,
    HidePromotion,
    SetBestTime {
        level: Difficulty,
        time: f64,
    },
    RestoreSession {
        session: SavedSession,
    },
    /// Any action type this version does not know; applying it changes nothing.
    #[serde(other)]
    Unknown,
}

impl Action {
    pub const fn open(position: Position) -> Self {
        Self::OpenField {
            row: position.row,
            column: position.column,
        }
    }

    pub const fn select(position: Position) -> Self {
        Self::SelectField {
            row: position.row,
            column: position.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_actions() {
        let action: Action =
            serde_json::from_str(r#"{"type": "OPEN_FIELD", "row": 2, "column": 3}"#).unwrap();
        assert_eq!(action, Action::open(Position::new(2, 3)));

        let action: Action = serde_json::from_str(r#"{"type": "NEW_GAME"}"#).unwrap();
        assert_eq!(action, Action::NewGame);

        let action: Action =
            serde_json::from_str(r#"{"type": "SET_MODE", "mode": "casual"}"#).unwrap();
        assert_eq!(action, Action::SetMode { mode: Mode::Casual });
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let action: Action = serde_json::from_str(r#"{"type": "PLAY_MUSIC"}"#).unwrap();

        assert_eq!(action, Action::Unknown);
    }
}

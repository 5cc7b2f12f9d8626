//! Error taxonomy shared by the core, the client and the driver.

use crate::sim::GamePhase;

/// Everything that can go wrong while playing a session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Local validation failed; no request was sent
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The scoring service answered non-2xx, or could not be reached
    #[error("remote error: {0}")]
    Remote(String),
    /// A call was attempted while another one is still outstanding
    #[error("{0} attempted while another request is in flight")]
    ConcurrencyViolation(&'static str),
    /// The action is not valid in the current phase
    #[error("cannot {action} while {phase:?}")]
    WrongPhase {
        phase: GamePhase,
        action: &'static str,
    },
    #[error("no item with id {0:?} on the board")]
    UnknownItem(String),
}

impl GameError {
    /// Whether the player should see this error (inline message / alert).
    ///
    /// The remaining variants indicate a caller bug and are only logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, GameError::InvalidInput(_) | GameError::Remote(_))
    }
}

impl From<reqwest::Error> for GameError {
    fn from(err: reqwest::Error) -> Self {
        GameError::Remote(err.to_string())
    }
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_visible_split() {
        assert!(GameError::InvalidInput("class".into()).is_user_visible());
        assert!(GameError::Remote("HTTP 500".into()).is_user_visible());
        assert!(!GameError::ConcurrencyViolation("submit").is_user_visible());
        assert!(
            !GameError::WrongPhase {
                phase: GamePhase::Idle,
                action: "submit",
            }
            .is_user_visible()
        );
    }

    #[test]
    fn test_remote_message_passthrough() {
        let err = GameError::Remote("Session not found".into());
        assert_eq!(err.to_string(), "remote error: Session not found");
    }
}

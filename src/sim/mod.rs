//! Pure game core
//!
//! Everything here is deterministic and free of I/O:
//! - Zone classification is a pure function of an item point and two circles
//! - The board is a single-owner position store
//! - The session state machine hands out requests and consumes responses

pub mod board;
pub mod session;
pub mod zone;

pub use board::{Board, BoardSnapshot, Item};
pub use session::{
    GameEvent, GamePhase, GameState, LevelRequest, Outcome, Player, Session, StartRequest,
    SubmitRequest, Ticket, Verdict,
};
pub use zone::{Circle, CircleId, ZoneLabel, classify};

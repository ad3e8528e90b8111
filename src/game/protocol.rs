//! Seam to an external engine-communication protocol (e.g. a WinBoard or UCI
//! front end driving this contest).

use crate::game::moves::MoveRecord;

/// Why the side to move may claim a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Repetition,
    FiftyMoveRule,
    InsufficientMaterial,
}

/// Receives the moves played by automated sides and the game-ending
/// conditions they produce.
pub trait ProtocolAdapter: Send {
    /// While active, automatic backups are disabled.
    fn is_active(&self) -> bool;

    fn send_move(&mut self, record: &MoveRecord);

    fn send_checkmate(&mut self);

    fn send_stalemate(&mut self);

    fn send_draw(&mut self, reason: DrawReason);

    fn stop_listener(&mut self);
}

/// No external protocol attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl ProtocolAdapter for Detached {
    fn is_active(&self) -> bool {
        false
    }

    fn send_move(&mut self, _record: &MoveRecord) {}

    fn send_checkmate(&mut self) {}

    fn send_stalemate(&mut self) {}

    fn send_draw(&mut self, _reason: DrawReason) {}

    fn stop_listener(&mut self) {}
}

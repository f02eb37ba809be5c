use crate::tape::{Tape, TapeMark};
use crate::window::InputWindow;

/// A saved window position and tape length for speculative parsing.
///
/// Every grammar attempt runs between a `begin` and exactly one of
/// [`commit`](Self::commit) or [`rollback`](Self::rollback).
///
/// ## Drop Bomb
///
/// A checkpoint that is dropped without being consumed panics: a forgotten
/// rollback would leave a half-written construct on the tape.
#[must_use = "a Checkpoint must be committed or rolled back"]
pub struct Checkpoint {
    position: usize,
    mark: TapeMark,
    consumed: bool,
}

impl Checkpoint {
    pub fn begin(window: &InputWindow, tape: &Tape) -> Self {
        Self {
            position: window.position(),
            mark: tape.mark(),
            consumed: false,
        }
    }

    /// Window position at `begin`.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Keeps everything parsed since `begin`.
    pub fn commit(mut self) {
        self.consumed = true;
    }

    /// Restores the window position and the tape exactly as they were.
    pub fn rollback(mut self, window: &mut InputWindow, tape: &mut Tape) {
        self.consumed = true;
        window.set_position(self.position);
        tape.rollback_to(self.mark);
    }
}

impl Drop for Checkpoint {
    fn drop(&mut self) {
        if !self.consumed && !std::thread::panicking() {
            panic!("Checkpoint must be either committed or rolled back");
        }
    }
}

//! Jump intent capture
//!
//! Keyboard and pointer events arrive between frames. They are latched
//! here and consumed by the next simulation tick, never mid-frame.

/// The one key that jumps (`KeyboardEvent.code`)
pub const JUMP_KEY_CODE: &str = "Space";

/// Whether a keyboard event code is the jump key
pub fn is_jump_key(code: &str) -> bool {
    code == JUMP_KEY_CODE
}

/// One-shot jump latch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLatch {
    jump: bool,
}

impl InputLatch {
    /// Record a jump intent (key press, tap, click)
    pub fn press_jump(&mut self) {
        self.jump = true;
    }

    pub fn jump_pending(&self) -> bool {
        self.jump
    }

    /// Consume the pending intent, if any
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump)
    }

    pub fn clear(&mut self) {
        self.jump = false;
    }
}

//! Key-sequence matcher that gates activation.

/// Up, Up, Down, Down, Left, Right, Left, Right, B, A.
pub const ACTIVATION_SEQUENCE: [SeqKey; 10] = [
    SeqKey::Up,
    SeqKey::Up,
    SeqKey::Down,
    SeqKey::Down,
    SeqKey::Left,
    SeqKey::Right,
    SeqKey::Left,
    SeqKey::Right,
    SeqKey::B,
    SeqKey::A,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqKey {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
}

impl SeqKey {
    /// Map a DOM-style key name (`"ArrowUp"`, `"b"`, ...). Letters are
    /// case-insensitive; anything else is `None`.
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "Up" => Some(SeqKey::Up),
            "ArrowDown" | "Down" => Some(SeqKey::Down),
            "ArrowLeft" | "Left" => Some(SeqKey::Left),
            "ArrowRight" | "Right" => Some(SeqKey::Right),
            k if k.eq_ignore_ascii_case("a") => Some(SeqKey::A),
            k if k.eq_ignore_ascii_case("b") => Some(SeqKey::B),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SequenceMatcher {
    progress: usize,
}

impl SequenceMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn progress(&self) -> usize {
        self.progress
    }

    /// Feed one key press. Returns `true` exactly when the final key of the
    /// sequence lands; progress then restarts at zero. Any mismatch resets.
    pub fn feed(&mut self, key: Option<SeqKey>) -> bool {
        if key == Some(ACTIVATION_SEQUENCE[self.progress]) {
            self.progress += 1;
            if self.progress == ACTIVATION_SEQUENCE.len() {
                self.progress = 0;
                return true;
            }
        } else {
            self.progress = 0;
        }
        false
    }

    pub fn feed_key_name(&mut self, key: &str) -> bool {
        self.feed(SeqKey::from_key_name(key))
    }
}

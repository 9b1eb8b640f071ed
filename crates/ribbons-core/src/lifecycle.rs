//! Mount state shared by the front-ends: at most one activation exists, and
//! activating while one is mounting or running is refused.

use crate::effect::CancelToken;

pub enum Mount<A> {
    Idle,
    /// Setup is in flight (async GPU init on the web).
    Mounting(CancelToken),
    Active(A),
}

impl<A> Default for Mount<A> {
    fn default() -> Self {
        Mount::Idle
    }
}

impl<A> Mount<A> {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Mount::Idle)
    }

    /// Start mounting. `None` when something is already mounting or active.
    pub fn begin(&mut self) -> Option<CancelToken> {
        if !self.is_idle() {
            return None;
        }
        let token = CancelToken::new();
        *self = Mount::Mounting(token.clone());
        Some(token)
    }

    /// Record the outcome of a mount started with `token`. A mount that was
    /// cancelled meanwhile is handed back so the caller can drop it.
    pub fn finish(&mut self, token: &CancelToken, mounted: Option<A>) -> Option<A> {
        match mounted {
            Some(a) if !token.is_cancelled() => {
                *self = Mount::Active(a);
                None
            }
            other => {
                *self = Mount::Idle;
                other
            }
        }
    }

    /// Tear down: an active value is returned for dropping; a pending mount
    /// is cancelled and stays pending until `finish`.
    pub fn teardown(&mut self) -> Option<A> {
        match std::mem::take(self) {
            Mount::Idle => None,
            Mount::Mounting(token) => {
                token.cancel();
                *self = Mount::Mounting(token);
                None
            }
            Mount::Active(a) => Some(a),
        }
    }
}

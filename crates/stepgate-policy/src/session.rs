use std::sync::atomic::{AtomicBool, Ordering};

/// "Already challenged this foreground session" gate.
///
/// Starts armed. `test_and_clear` hands out `true` at most once until the
/// next `reset`. Owned by whatever composes the policy and shared through an
/// `Arc`; independent instances never share state.
#[derive(Debug)]
pub struct SessionPromptState {
    armed: AtomicBool,
}

impl SessionPromptState {
    pub fn new() -> Self {
        Self {
            armed: AtomicBool::new(true),
        }
    }

    /// A state that has already handed out its prompt for this session.
    pub fn disarmed() -> Self {
        Self {
            armed: AtomicBool::new(false),
        }
    }

    /// Return the current flag and clear it in one atomic step.
    pub fn test_and_clear(&self) -> bool {
        self.armed.swap(false, Ordering::SeqCst)
    }

    /// Re-arm the flag. Called only on a lost-foreground transition.
    pub fn reset(&self) {
        self.armed.store(true, Ordering::SeqCst);
        tracing::info!("Session prompt flag re-armed");
    }

    /// Read the flag without clearing it.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

impl Default for SessionPromptState {
    fn default() -> Self {
        Self::new()
    }
}

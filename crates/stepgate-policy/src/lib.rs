//! Stepgate Policy
//!
//! Decides, per access attempt, whether the caller should be challenged,
//! skipped, blocked pending setup, or let through.
//!
//! Key features:
//! - Fixed-precedence decision policy: bypass override, then tier, then
//!   capability facts, then the session prompt flag
//! - At most one challenge per foreground session via an atomic
//!   test-and-clear flag, re-armed only when the app leaves the foreground
//! - Lifecycle bridge that turns host foreground events into flag resets
//! - Optional audit sink receiving one record per evaluation

pub mod engine;
pub mod lifecycle;
pub mod session;

pub use engine::{evaluate, DecisionAuditSink, DecisionPolicy, InMemoryDecisionSink};
pub use lifecycle::{ForegroundEvent, ForegroundLifecycleBridge};
pub use session::SessionPromptState;

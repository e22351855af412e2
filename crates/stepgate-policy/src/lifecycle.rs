//! Foreground lifecycle bridge.
//!
//! Translates host visibility events into session prompt resets. The host
//! either calls [`ForegroundLifecycleBridge::on_lost_foreground`] directly or
//! pushes [`ForegroundEvent`]s into the channel served by
//! [`ForegroundLifecycleBridge::spawn`]. An in-flight challenge is never
//! cancelled here; only the flag is re-armed.

use std::sync::Arc;

use stepgate_core::ForegroundObserver;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::SessionPromptState;

/// Visibility transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundEvent {
    /// The application became visible.
    Entered,
    /// The application stopped being visible.
    Lost,
}

#[derive(Debug, Clone)]
pub struct ForegroundLifecycleBridge {
    session: Arc<SessionPromptState>,
}

impl ForegroundLifecycleBridge {
    pub fn new(session: Arc<SessionPromptState>) -> Self {
        Self { session }
    }

    pub fn on_lost_foreground(&self) {
        self.session.reset();
    }

    pub fn handle(&self, event: ForegroundEvent) {
        match event {
            ForegroundEvent::Lost => self.on_lost_foreground(),
            ForegroundEvent::Entered => {
                tracing::debug!("Application entered foreground");
            }
        }
    }

    /// Serve events from `events` until every sender is dropped.
    pub fn spawn(self, mut events: mpsc::UnboundedReceiver<ForegroundEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle(event);
            }
            tracing::debug!("Foreground event channel closed");
        })
    }
}

impl ForegroundObserver for ForegroundLifecycleBridge {
    fn on_lost_foreground(&self) {
        ForegroundLifecycleBridge::on_lost_foreground(self);
    }
}

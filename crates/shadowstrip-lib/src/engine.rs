//! Shadow reconciliation: deciding what an inbound document means for the
//! strip, and carrying it out.
//!
//! [`Engine::handle`] is pure (document in, action out) so every dispatch
//! rule is testable without I/O; [`Engine::apply`] performs the render and,
//! when the action calls for it, the reported-state publish.

use crate::led::{self, LedStrip, StripError, decode_color};
use crate::shadow::{ReportDocument, ShadowTopics, TopicKind, extract_desired};
use crate::transport::Transport;

/// What an inbound shadow document asks the device to do.
///
/// `color` is already decoded and `count` already clamped, so an action can
/// be executed (and reported) exactly as carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Render only.
    Apply { color: u32, count: usize },
    /// Render, then publish the reported state.
    ApplyAndReport { color: u32, count: usize },
}

/// Dispatches classified shadow messages into strip actions.
pub struct Engine {
    topics: ShadowTopics,
    capacity: usize,
}

impl Engine {
    pub fn new(topics: ShadowTopics, capacity: usize) -> Self {
        Engine { topics, capacity }
    }

    /// Decide the action for one classified inbound message.
    ///
    /// Returns `None` for inert messages: payloads that are not JSON, lack
    /// the expected state substructure, or carry no colour field. A present
    /// but malformed colour is NOT inert; it decodes to black and the
    /// action proceeds.
    ///
    /// Dispatch:
    /// * `update/delta`: the cloud says reported diverged from desired.
    ///   Apply and report.
    /// * `get/accepted`: a point-in-time snapshot we asked for. Apply only;
    ///   nothing server-side is waiting on a reply, so re-reporting is
    ///   noise.
    /// * `update/accepted`: some update (possibly a concurrent external
    ///   one) was accepted. Apply and report. Our own reports carry no
    ///   `desired` section, so they come back inert and cannot loop.
    pub fn handle(&self, kind: TopicKind, payload: &[u8]) -> Option<Action> {
        let desired = extract_desired(kind, payload)?;
        let color = decode_color(&desired.color?);
        // Documents without a count light the whole strip.
        let count = desired.count.unwrap_or(self.capacity).min(self.capacity);
        Some(match kind {
            TopicKind::UpdateDelta => Action::ApplyAndReport { color, count },
            TopicKind::GetAccepted => Action::Apply { color, count },
            TopicKind::UpdateAccepted => Action::ApplyAndReport { color, count },
        })
    }

    /// Execute an action: render, and for [`Action::ApplyAndReport`] publish
    /// the reported document for the values actually applied.
    ///
    /// A refused publish is logged and absorbed; the next delta will say so
    /// if the cloud still disagrees. A failed render skips the report, so a
    /// report never claims state the strip does not show.
    pub fn apply(
        &self,
        action: Action,
        strip: &mut impl LedStrip,
        transport: &mut impl Transport,
    ) -> Result<(), StripError> {
        match action {
            Action::Apply { color, count } => led::apply_state(strip, color, count),
            Action::ApplyAndReport { color, count } => {
                led::apply_state(strip, color, count)?;
                let payload = ReportDocument::new(color, count).to_payload();
                if !transport.publish(&self.topics.update, &payload) {
                    log::warn!("reported-state publish refused on {}", self.topics.update);
                }
                Ok(())
            }
        }
    }

    /// Handle one message and carry out whatever it asks for.
    ///
    /// Returns the decided action (if any) and the render error (if any),
    /// separately: an inert message and a failed render are different
    /// non-events.
    pub fn handle_and_apply(
        &self,
        kind: TopicKind,
        payload: &[u8],
        strip: &mut impl LedStrip,
        transport: &mut impl Transport,
    ) -> (Option<Action>, Option<StripError>) {
        match self.handle(kind, payload) {
            Some(action) => match self.apply(action, strip, transport) {
                Ok(()) => (Some(action), None),
                Err(e) => (Some(action), Some(e)),
            },
            None => (None, None),
        }
    }
}

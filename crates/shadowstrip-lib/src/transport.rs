//! The pub/sub transport boundary.
//!
//! [`Transport`] is the seam between the supervisor/engine and the actual
//! MQTT session. Connect and publish return plain `bool`s: refusal is an
//! expected outcome the supervisor retries, not an error. `pump` hands over
//! at most one inbound message per call, topic already classified, and the
//! caller dispatches it inline within the same tick. Run to completion,
//! no queues, no threads.

use crate::shadow::TopicKind;
use crate::trust::TrustMaterial;

/// One inbound shadow message, classified at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub kind: TopicKind,
    pub payload: Vec<u8>,
}

/// Pub/sub session boundary.
pub trait Transport {
    /// Attempt to establish the session.
    ///
    /// Trust material is optional so a degraded boot still attempts the
    /// connect and fails at the TLS layer instead of short-circuiting.
    fn connect(&mut self, identity: &str, trust: Option<&TrustMaterial>) -> bool;

    /// Register interest in a topic. Failures surface via liveness.
    fn subscribe(&mut self, topic: &str);

    /// Publish a payload. Returns `false` when the session refused it.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool;

    /// Session liveness as currently known.
    fn is_connected(&self) -> bool;

    /// Deliver at most one buffered inbound message.
    fn pump(&mut self) -> Option<Inbound>;
}

/// Mock transport for tests. Not part of the public API surface.
#[doc(hidden)]
pub mod mock {
    use std::collections::VecDeque;

    use super::{Inbound, Transport};
    use crate::shadow::TopicKind;
    use crate::trust::TrustMaterial;

    /// Fully scripted transport: connect outcomes are queued, everything the
    /// daemon does is recorded.
    pub struct MockTransport {
        /// Scripted results for successive `connect` calls. Once exhausted,
        /// connects succeed.
        pub connect_script: VecDeque<bool>,
        /// Current liveness; tests may clear this to simulate a drop.
        pub connected: bool,
        /// `(identity, trust material present)` per connect call.
        pub connects: Vec<(String, bool)>,
        /// Topics subscribed, in call order, across all sessions.
        pub subscriptions: Vec<String>,
        /// `(topic, payload)` per successful publish.
        pub published: Vec<(String, Vec<u8>)>,
        /// When true, `publish` refuses.
        pub fail_publish: bool,
        /// Queued inbound messages returned by `pump`.
        pub inbound: VecDeque<Inbound>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            MockTransport {
                connect_script: VecDeque::new(),
                connected: false,
                connects: Vec::new(),
                subscriptions: Vec::new(),
                published: Vec::new(),
                fail_publish: false,
                inbound: VecDeque::new(),
            }
        }

        /// Queue the outcome of the next `connect` call.
        pub fn push_connect_result(&mut self, ok: bool) {
            self.connect_script.push_back(ok);
        }

        /// Queue an inbound message for `pump`.
        pub fn push_inbound(&mut self, kind: TopicKind, payload: &[u8]) {
            self.inbound.push_back(Inbound {
                kind,
                payload: payload.to_vec(),
            });
        }

        /// Simulate a dropped session.
        pub fn drop_session(&mut self) {
            self.connected = false;
        }

        /// Payloads published to one topic.
        pub fn published_to(&self, topic: &str) -> Vec<&[u8]> {
            self.published
                .iter()
                .filter(|(t, _)| t == topic)
                .map(|(_, p)| p.as_slice())
                .collect()
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for MockTransport {
        fn connect(&mut self, identity: &str, trust: Option<&TrustMaterial>) -> bool {
            let ok = self.connect_script.pop_front().unwrap_or(true);
            self.connects.push((identity.to_owned(), trust.is_some()));
            self.connected = ok;
            ok
        }

        fn subscribe(&mut self, topic: &str) {
            self.subscriptions.push(topic.to_owned());
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
            if self.fail_publish || !self.connected {
                return false;
            }
            self.published.push((topic.to_owned(), payload.to_vec()));
            true
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn pump(&mut self) -> Option<Inbound> {
            if !self.connected {
                return None;
            }
            self.inbound.pop_front()
        }
    }
}

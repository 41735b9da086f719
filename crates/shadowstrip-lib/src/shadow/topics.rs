//! Shadow topic construction and classification.
//!
//! Every topic lives under `$aws/things/<thing-name>/shadow`. Inbound topics
//! are classified once, by suffix, when the transport hands a message over;
//! nothing else in the crate looks at raw topic text.

// ── Inbound topic suffixes ──

/// Cloud → device: desired state diverged from reported state.
pub const SUFFIX_UPDATE_DELTA: &str = "/shadow/update/delta";

/// Cloud → device: response to a shadow `get` request.
pub const SUFFIX_GET_ACCEPTED: &str = "/shadow/get/accepted";

/// Cloud → device: a shadow update (ours or anyone's) was accepted.
pub const SUFFIX_UPDATE_ACCEPTED: &str = "/shadow/update/accepted";

/// Kind tag attached to an inbound message at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    UpdateDelta,
    GetAccepted,
    UpdateAccepted,
}

impl TopicKind {
    /// Classify a raw topic by suffix. Unknown topics yield `None` and are
    /// dropped by the caller.
    pub fn classify(topic: &str) -> Option<TopicKind> {
        if topic.ends_with(SUFFIX_UPDATE_DELTA) {
            Some(TopicKind::UpdateDelta)
        } else if topic.ends_with(SUFFIX_GET_ACCEPTED) {
            Some(TopicKind::GetAccepted)
        } else if topic.ends_with(SUFFIX_UPDATE_ACCEPTED) {
            Some(TopicKind::UpdateAccepted)
        } else {
            None
        }
    }
}

/// Resolved topic set for one thing's shadow, built once from the thing name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTopics {
    /// Subscription: delta documents.
    pub update_delta: String,
    /// Subscription: `get` responses.
    pub get_accepted: String,
    /// Subscription: accepted updates.
    pub update_accepted: String,
    /// Publication: empty payload requests the current shadow document.
    pub get: String,
    /// Publication: reported-state documents go here.
    pub update: String,
}

impl ShadowTopics {
    pub fn new(thing_name: &str) -> Self {
        let prefix = format!("$aws/things/{thing_name}/shadow");
        ShadowTopics {
            update_delta: format!("{prefix}/update/delta"),
            get_accepted: format!("{prefix}/get/accepted"),
            update_accepted: format!("{prefix}/update/accepted"),
            get: format!("{prefix}/get"),
            update: format!("{prefix}/update"),
        }
    }

    /// The three subscriptions, in subscription order.
    pub fn subscriptions(&self) -> [&str; 3] {
        [
            &self.update_delta,
            &self.get_accepted,
            &self.update_accepted,
        ]
    }
}

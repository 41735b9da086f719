//! Shadow document parsing and construction.
//!
//! Inbound documents are navigated as loose JSON: a missing field and a
//! wrong-typed field both read as absent, and a payload that is not JSON at
//! all simply carries no state. Nothing in here returns an error; a document
//! we cannot use is a document we ignore.

use serde::Serialize;
use serde_json::Value;

use crate::led::format_color;
use crate::shadow::topics::TopicKind;

/// Desired-state fragment extracted from an inbound shadow document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesiredState {
    /// Colour text exactly as carried on the wire.
    pub color: Option<String>,
    /// Active pixel count. Negative and non-integer values read as absent.
    pub count: Option<usize>,
}

impl DesiredState {
    fn from_value(value: &Value) -> DesiredState {
        DesiredState {
            color: value.get("color").and_then(Value::as_str).map(str::to_owned),
            count: value
                .get("count")
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok()),
        }
    }
}

/// Extract the desired-state fragment from a classified inbound message.
///
/// Delta documents carry the fields directly under `state`; `get` responses
/// and accepted updates carry them under `state.desired`. Returns `None`
/// when the payload is not JSON or the expected substructure is missing.
pub fn extract_desired(kind: TopicKind, payload: &[u8]) -> Option<DesiredState> {
    let doc: Value = serde_json::from_slice(payload).ok()?;
    let state = doc.get("state")?;
    let fields = match kind {
        TopicKind::UpdateDelta => state,
        TopicKind::GetAccepted | TopicKind::UpdateAccepted => state.get("desired")?,
    };
    if !fields.is_object() {
        return None;
    }
    Some(DesiredState::from_value(fields))
}

// ── Outbound report ──

/// Reported-state document published after an apply:
/// `{"state":{"reported":{"color":"FF0000","count":2}}}`.
///
/// Carries only the `reported` section. Echoing `desired` back would make
/// our own accepted updates actionable again and open an update loop.
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    state: ReportState,
}

#[derive(Debug, Serialize)]
struct ReportState {
    reported: ReportedFields,
}

#[derive(Debug, Serialize)]
struct ReportedFields {
    color: String,
    count: usize,
}

impl ReportDocument {
    /// Report for the applied (post-clamp) values.
    pub fn new(color: u32, count: usize) -> Self {
        ReportDocument {
            state: ReportState {
                reported: ReportedFields {
                    color: format_color(color),
                    count,
                },
            },
        }
    }

    /// Serialized payload for the `update` topic.
    pub fn to_payload(&self) -> Vec<u8> {
        // Fixed string/integer shape; serialization cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

//! Shadow wire model: topics, inbound documents, outbound reports.

mod message;
mod topics;

pub use message::{DesiredState, ReportDocument, extract_desired};
pub use topics::{
    SUFFIX_GET_ACCEPTED, SUFFIX_UPDATE_ACCEPTED, SUFFIX_UPDATE_DELTA, ShadowTopics, TopicKind,
};

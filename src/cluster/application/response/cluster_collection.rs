use crate::core::domain::{model::cluster::Cluster, value_object::serde_helpers::null_as_default};
use serde::Deserialize;

/// `data` payload of the list endpoints: `{"clusters": [...]}`.
///
/// A missing or `null` list reads as empty; any other non-list value fails
/// to decode.
#[derive(Debug, Deserialize)]
pub struct ClusterCollection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<Cluster>,
}

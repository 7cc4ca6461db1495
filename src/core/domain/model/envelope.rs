//! Response envelopes shared by the backend services.

use serde::Deserialize;

/// `{"data": ..., "message": ...}` wrapper used by resource endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

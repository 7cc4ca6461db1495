mod access_token;
mod base_url;
mod identifier;
pub(crate) mod serde_helpers;
mod service_name;

pub use access_token::AccessToken;
pub use base_url::BaseUrl;
pub use identifier::Identifier;
pub use service_name::ServiceName;

// Re-export validation functions for internal use
pub(crate) use access_token::validate_access_token;
pub(crate) use base_url::validate_base_url;
pub(crate) use identifier::validate_identifier;
pub(crate) use service_name::validate_service_name;

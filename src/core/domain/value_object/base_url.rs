use crate::core::domain::error::ValidationError;
use url::Url;

const MAX_URL_LENGTH: usize = 2083;

/// A validated API gateway base URL.
///
/// Every service path is resolved against this URL, so it must be an
/// absolute `http`/`https` URL with a host and without query or fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Creates a new base URL without validation.
    pub(crate) fn new_unchecked(url: Url) -> Self {
        Self(url)
    }

    /// Parses and validates a base URL.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validate_base_url(raw).map(Self::new_unchecked)
    }

    /// Returns the underlying URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Resolves path segments against the base URL.
    ///
    /// Each segment is percent-encoded on its own, so identifiers containing
    /// `/` or spaces stay a single segment. An empty trailing segment yields
    /// a trailing slash.
    #[must_use]
    pub fn join_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.0.clone();
        // Base URLs are validated to have a host, so they can always be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Validates and parses a base URL.
pub(crate) fn validate_base_url(raw: &str) -> Result<Url, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::field("base_url", "Base URL cannot be empty"));
    }
    if raw.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "Base URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let url = Url::parse(raw)
        .map_err(|e| ValidationError::Format(format!("Invalid base URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be one of: http, https",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::field("base_url", "Base URL must include a host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::ConstraintViolation(
            "Base URL cannot carry a query string or fragment".to_string(),
        ));
    }
    Ok(url)
}

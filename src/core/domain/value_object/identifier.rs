use crate::core::domain::{error::ValidationError, value_object::serde_helpers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A backend identifier that always travels as a JSON string.
///
/// The backend requires user, offer, image and VM identifiers in string
/// form, while callers often hold them as integers. `Identifier` accepts
/// either on input (including from JSON) and always serializes as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(String);

impl Identifier {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! identifier_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Identifier {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

identifier_from_integer!(u32, u64, i32, i64, usize);

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_helpers::string_or_number::deserialize(deserializer).map(Self)
    }
}

/// Validates an identifier about to be sent to the backend.
pub(crate) fn validate_identifier(field: &str, id: &Identifier) -> Result<(), ValidationError> {
    if id.as_str().trim().is_empty() {
        return Err(ValidationError::field(field, "Identifier cannot be empty"));
    }
    Ok(())
}

use crate::domain::errors::ValidationError;

/// The name of a top-level bucket
///
/// Naming rules (length, allowed punctuation, reserved prefixes) belong to the
/// remote service. Locally a name only has to be usable as a single URL path
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyBucketName);
        }

        if value.contains('/') {
            return Err(ValidationError::BucketNameContainsSeparator);
        }

        if let Some(c) = value.chars().find(|c| c.is_control() || c.is_whitespace()) {
            return Err(ValidationError::InvalidBucketNameCharacter(c));
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BucketName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

use crate::domain::errors::ValidationError;

/// Separator between the segments of an object key
pub const FILE_SEPARATOR: &str = "/";

/// The full name of an object within a bucket
///
/// The store is flat. Hierarchy is emulated through `/`-separated segments, and
/// a folder is a zero-byte object whose key ends with the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey
    ///
    /// Reserved characters and length limits are left to the remote service.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.starts_with(FILE_SEPARATOR) {
            return Err(ValidationError::ObjectKeyStartsWithSeparator);
        }

        Ok(Self(value))
    }

    /// Compose a key from an optional folder and a file name, in that order
    pub fn compose(folder: Option<&str>, file: &str) -> Result<Self, ValidationError> {
        if file.is_empty() {
            return Err(ValidationError::EmptyFileName);
        }

        match folder {
            Some(folder) => Self::new(format!("{}{}{}", folder, FILE_SEPARATOR, file)),
            None => Self::new(file),
        }
    }

    /// Key of the zero-byte marker object standing in for a folder
    pub fn folder(name: &str) -> Result<Self, ValidationError> {
        Self::new(format!("{}{}", name, FILE_SEPARATOR))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key names a folder marker
    pub fn is_folder(&self) -> bool {
        self.0.ends_with(FILE_SEPARATOR)
    }

    /// Iterate over the non-empty segments of the key
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(FILE_SEPARATOR).filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

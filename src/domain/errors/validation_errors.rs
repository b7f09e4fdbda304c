/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyStartsWithSeparator,
    EmptyFileName,

    // BucketName validation errors
    EmptyBucketName,
    BucketNameContainsSeparator,
    InvalidBucketNameCharacter(char),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectKey errors
            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyStartsWithSeparator => {
                write!(f, "Object key cannot start with '/'")
            }
            ValidationError::EmptyFileName => write!(f, "File name cannot be empty"),

            // BucketName errors
            ValidationError::EmptyBucketName => write!(f, "Bucket name cannot be empty"),
            ValidationError::BucketNameContainsSeparator => {
                write!(f, "Bucket name cannot contain '/'")
            }
            ValidationError::InvalidBucketNameCharacter(c) => {
                write!(f, "Invalid character in bucket name: {:?}", c)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

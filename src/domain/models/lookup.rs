/// Outcome of resolving an object through its bucket
///
/// Keeps apart the two remote conditions that the plain accessors collapse into
/// an empty result. Transport failures are never folded in here; they stay errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    BucketNotFound,
    ObjectNotFound,
}

impl<T> Lookup<T> {
    /// Collapse to the found value, discarding which part was missing
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::BucketNotFound | Lookup::ObjectNotFound => None,
        }
    }
}

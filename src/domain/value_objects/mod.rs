mod blob_id;
mod bucket_name;
mod object_key;

pub use blob_id::BlobId;
pub use bucket_name::BucketName;
pub use object_key::{FILE_SEPARATOR, ObjectKey};

pub mod blob;
pub mod bucket;
pub mod content;
pub mod lookup;
pub mod page;

pub use blob::Blob;
pub use bucket::Bucket;
pub use content::{BoxedReader, ContentSource, TRANSFER_CHUNK_SIZE};
pub use lookup::Lookup;
pub use page::Page;

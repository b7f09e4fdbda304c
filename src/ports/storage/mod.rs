mod authenticator;
mod storage_backend;

pub use authenticator::{Authenticator, StaticAuthenticator};
pub use storage_backend::{ByteStream, StorageBackend};

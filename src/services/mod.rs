// src/services/mod.rs
//
// External capabilities: the identity provider, object storage and the
// session cipher

pub mod aws;
pub mod encryption;
pub mod google;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types for convenience
pub use aws::{ObjectStore, S3Store};
pub use encryption::SessionCipher;
pub use google::{GoogleProvider, IdentityProvider};

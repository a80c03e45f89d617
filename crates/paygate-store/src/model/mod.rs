pub mod credential;

pub use credential::{CredentialRecord, PasswordDigest, Salt};

//! User data handling
//!
//! The request carries user data base64-encoded; state keeps only its SHA-1
//! hex digest so large payloads never land in the state file.

use base64::Engine;
use sha1::{Digest, Sha1};

/// SHA-1 hex digest of `user_data`, the form stored in state
pub fn state_value(user_data: &str) -> String {
    hex::encode(Sha1::digest(user_data.as_bytes()))
}

/// Base64 (standard alphabet) encoding used in the create request
pub fn encode(user_data: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(user_data.as_bytes())
}

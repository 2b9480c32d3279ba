/// Security module for authentication
/// Provides password hashing and verification

pub mod password;

pub use password::{hash_password, validate_password_strength, verify_password};

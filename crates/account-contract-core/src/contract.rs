// crates/account-contract-core/src/contract.rs
// ============================================================================
// Module: Observed Service Contract
// Description: Paths, status codes, and messages of the remote account API.
// Purpose: Keep every wire literal the suite asserts on in one place.
// Dependencies: none
// ============================================================================

//! ## Overview
//! These constants record the contract as the remote service actually
//! behaves, including its inconsistencies: a failed login answers 404 while a
//! bad token on lookup answers 401. They are asserted as observed, not
//! corrected.

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Signup endpoint (`POST`).
pub const USER_PATH: &str = "/Account/v1/User";
/// Token endpoint (`POST`).
pub const GENERATE_TOKEN_PATH: &str = "/Account/v1/GenerateToken";
/// Login check endpoint (`POST`).
pub const AUTHORIZED_PATH: &str = "/Account/v1/Authorized";
/// Literal template path probed for existence.
pub const USER_TEMPLATE_PATH: &str = "/Account/v1/User/{UUID}";

/// Returns the lookup/delete path for a user id.
#[must_use]
pub fn user_path(user_id: &str) -> String {
    format!("{USER_PATH}/{user_id}")
}

// ============================================================================
// SECTION: Status Codes
// ============================================================================

/// Status for a fresh signup.
pub const STATUS_CREATED: u16 = 201;
/// Status the service uses when a username is taken.
pub const STATUS_ALREADY_EXISTS: u16 = 406;
/// Generic success.
pub const STATUS_OK: u16 = 200;
/// Successful delete.
pub const STATUS_NO_CONTENT: u16 = 204;
/// Rejected token or unknown id on lookup.
pub const STATUS_UNAUTHORIZED: u16 = 401;
/// Failed login, and the "method missing" signal for probes.
pub const STATUS_NOT_FOUND: u16 = 404;

// ============================================================================
// SECTION: Error Bodies
// ============================================================================

/// Error code for unknown users and malformed ids.
pub const CODE_NOT_FOUND: &str = "1207";
/// Error code for rejected tokens.
pub const CODE_NOT_AUTHORIZED: &str = "1200";
/// Message for unknown users.
pub const MSG_USER_NOT_FOUND: &str = "User not found!";
/// Message for rejected tokens.
pub const MSG_USER_NOT_AUTHORIZED: &str = "User not authorized!";
/// Message for malformed ids on delete.
pub const MSG_USER_ID_NOT_CORRECT: &str = "User Id not correct!";
/// Token endpoint status field on success.
pub const TOKEN_STATUS_SUCCESS: &str = "Success";

// ============================================================================
// SECTION: Tamper Suffixes
// ============================================================================

/// Suffix appended to a valid token to make it invalid.
pub const TOKEN_TAMPER_SUFFIX: &str = "test";
/// Suffix appended to a valid id before a lookup.
pub const VERIFY_ID_TAMPER_SUFFIX: &str = "-test";
/// Suffix appended to a valid id before a delete.
pub const DELETE_ID_TAMPER_SUFFIX: &str = "test";

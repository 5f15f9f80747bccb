// system-tests/src/lib.rs
// ============================================================================
// Module: Account Contract System Tests Library
// Description: Shared configuration for live-service system tests.
// Purpose: Resolve where live runs point and where their artifacts go.
// Dependencies: account-contract-core
// ============================================================================

//! ## Overview
//! Live system tests run the scenario catalog against a real account service.
//! They are compiled only with the `system-tests` feature so a plain
//! `cargo test` never touches the network.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

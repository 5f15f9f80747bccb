// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for live system tests.
// Dependencies: system-tests
// ============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers; not every suite uses every helper."
)]

pub mod artifacts;

//! Integration tests for Tycoon-Autopilot
//!
//! These tests use wiremock to stand in for the game and tempfile
//! directories for local state.

mod common;
mod reconcile_tests;
mod session_tests;

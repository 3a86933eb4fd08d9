//! Integration tests for search sessions
//!
//! These tests use wiremock to stand in for the booking sites and run full
//! sessions end-to-end: configuration, extraction, aggregation, storage and
//! export.

mod session_tests;

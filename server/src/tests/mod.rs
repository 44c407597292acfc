//! Integration tests for the Jotter server.
//!
//! These tests use in-process testing with `tower::ServiceExt::oneshot()`
//! for fast execution without needing a TCP server.


mod notes;

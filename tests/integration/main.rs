//! Integration tests for link-tally
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

mod crawl_tests;

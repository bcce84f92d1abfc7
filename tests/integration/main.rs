//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! fetcher, the discovery engine and the harvester end to end.

mod discovery_tests;
mod fixtures;
mod harvest_tests;

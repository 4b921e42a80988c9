//! Integration tests for the exporter
//!
//! These tests use wiremock to stand in for the access-log API and exercise the
//! HTTP fetcher and the full export cycle end-to-end.

mod export_tests;
mod fetcher_tests;

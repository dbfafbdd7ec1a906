//! Integration tests for the scrape and crawl flows
//!
//! These tests use wiremock to stand in for the scrape/crawl service and
//! drive the flows end-to-end, including persistence and export.

mod common;
mod crawl_tests;
mod scrape_tests;

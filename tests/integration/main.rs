//! Integration tests

mod api_tests;
mod channel_tests;

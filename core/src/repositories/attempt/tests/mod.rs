//! Tests for attempt stores

mod memory_tests;

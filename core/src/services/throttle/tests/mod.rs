//! Tests for the throttle engine

/// Unit tests for the planner engine through the public API
mod basic_tests;
mod engine_properties;

//! Unit tests for SMS module

mod create_transport_tests;

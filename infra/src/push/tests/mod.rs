//! Unit tests for push module

mod fcm_tests;

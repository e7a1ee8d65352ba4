//! Tests for role administration

#[cfg(test)]
mod service_tests;

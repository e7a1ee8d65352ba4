//! Tests for the notification pipeline

#[cfg(test)]
mod mocks;
#[cfg(test)]
mod worker_tests;

pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
#[path = "tests/serde_tests.rs"]
mod tests;

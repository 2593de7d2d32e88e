//! # moodverse_core
//!
//! Core domain logic for Moodverse: validating mood submissions, rendering
//! the soul-reading prompt, calling the completion provider and turning its
//! free-form reply back into a JSON portrait.

pub mod error;
pub mod normalize;
pub mod portrait;
pub mod prompt;
pub mod upstream;
pub mod validation;

pub use error::{ConfigError, PortraitError, PortraitResult};
pub use portrait::{PortraitReading, generate_portrait};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}

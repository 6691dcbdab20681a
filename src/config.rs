//! Defining the compiler config options.

/// Compile configuration.
#[derive(Default)]
pub struct Config {
    /// Verbose mode.
    pub verbose: bool,
}

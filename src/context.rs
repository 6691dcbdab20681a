//! Defining the compiler context.

use crate::config::Config;

/// Prints to stdout, but only when the context is in verbose mode.
macro_rules! verbose_print {
    ($ctx:expr, $($arg:tt)*) => {
        if $ctx.config.verbose {
            print!($($arg)*);
        }
    };
}

/// Prints a line to stdout, but only when the context is in verbose mode.
macro_rules! verbose_println {
    ($ctx:expr, $($arg:tt)*) => {
        if $ctx.config.verbose {
            println!($($arg)*);
        }
    };
}

/// Compiler context.
pub struct Context {
    /// Compiler configuration.
    pub config: Config,
}

impl Context {
    /// Creates a new compiler context.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

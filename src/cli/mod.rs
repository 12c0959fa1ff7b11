//! Command-line interface module
//!
//! This module contains the implementations for the CLI subcommands.

pub mod check_config;
pub mod replay;

/// Common CLI utilities
pub mod utils {
    use crate::error::Result;
    use std::path::PathBuf;

    /// Write output to file or stdout
    pub fn write_output(content: &str, output_path: Option<&PathBuf>) -> Result<()> {
        match output_path {
            Some(path) => {
                std::fs::write(path, content)?;
                Ok(())
            }
            None => {
                println!("{}", content);
                Ok(())
            }
        }
    }
}

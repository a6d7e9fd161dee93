//! Output writing for exports and status messages

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::config::OutputConfig;
use crate::error::Result;

/// Output writer that handles file vs stdout
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write export content to the configured destination
    pub fn write(&self, content: &str) -> Result<()> {
        if let Some(file_path) = &self.config.file {
            self.write_to_file(content, file_path)
        } else {
            self.write_to_stdout(content)
        }
    }

    /// Write a status line to stderr, keeping stdout clean for exports
    pub fn write_status(&self, message: &str) -> Result<()> {
        if !self.config.silent {
            eprintln!("{}", message);
        }
        Ok(())
    }

    /// Write verbose information (if enabled)
    pub fn write_verbose(&self, message: &str) -> Result<()> {
        if self.config.verbose && !self.config.silent {
            eprintln!("* {}", message);
        }
        Ok(())
    }

    fn write_to_file(&self, content: &str, file_path: &Path) -> Result<()> {
        let mut file = File::create(file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_to_stdout(&self, content: &str) -> Result<()> {
        io::stdout().write_all(content.as_bytes())?;
        Ok(())
    }
}

//! Paired output artifacts.

use std::fs;
use std::path::Path;

/// Accumulates fragments for the declarations and definitions artifacts.
#[derive(Debug, Default)]
pub struct OutputBuffers {
    declarations: Vec<String>,
    definitions: Vec<String>,
}

impl OutputBuffers {
    /// Creates empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment to the declarations artifact.
    pub fn push_decl(&mut self, fragment: impl Into<String>) {
        self.declarations.push(fragment.into());
    }

    /// Appends a fragment to the definitions artifact.
    pub fn push_def(&mut self, fragment: impl Into<String>) {
        self.definitions.push(fragment.into());
    }

    /// Appends the same fragment to both artifacts.
    pub fn push_both(&mut self, fragment: &str) {
        self.declarations.push(fragment.to_string());
        self.definitions.push(fragment.to_string());
    }

    /// Joins the fragments into the final artifacts.
    #[must_use]
    pub fn finish(self) -> GeneratedOutput {
        GeneratedOutput {
            header: self.declarations.concat(),
            implementation: self.definitions.concat(),
        }
    }
}

/// Text of both generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    /// Declarations artifact.
    pub header: String,
    /// Definitions artifact.
    pub implementation: String,
}

impl GeneratedOutput {
    /// Writes both artifacts, replacing existing files.
    ///
    /// # Errors
    /// Returns an IO error if either file cannot be written.
    pub fn write(&self, header_path: &Path, impl_path: &Path) -> std::io::Result<()> {
        fs::write(header_path, &self.header)?;
        tracing::debug!("wrote {}", header_path.display());
        fs::write(impl_path, &self.implementation)?;
        tracing::debug!("wrote {}", impl_path.display());
        Ok(())
    }
}

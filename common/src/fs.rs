use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub trait FsExt {
    /// Resolves the path against the working directory. Absolute paths are returned unchanged.
    fn relative_to_cwd(&self) -> Result<PathBuf>;
}

impl<P: AsRef<Path>> FsExt for P {
    fn relative_to_cwd(&self) -> Result<PathBuf> {
        let cwd_dir = std::env::current_dir().context("Failed to read the working directory")?;

        Ok(cwd_dir.join(self))
    }
}

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Every report lands in this directory, whatever path the caller asked for.
pub const RESULT_DIR: &str = "Result";

pub struct ResultDir {
    pub root: PathBuf,
}

impl ResultDir {
    /// `<base>/Result`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            root: base.into().join(RESULT_DIR),
        }
    }

    /// `<working directory>/Result`.
    pub fn current() -> Result<Self> {
        let cwd = std::env::current_dir().context("resolving working directory")?;
        Ok(Self::new(cwd))
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;
        Ok(())
    }

    /// Keeps only the final component of `file_name` and places it in the
    /// result directory.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        let base = Path::new(file_name)
            .file_name()
            .ok_or_else(|| anyhow!("output name {file_name:?} has no file name component"))?;
        Ok(self.root.join(base))
    }

    /// Creates the directory if needed and writes `bytes` in one go.
    pub fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure()?;
        let path = self.resolve(file_name)?;
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote report");
        Ok(path)
    }
}

use crate::domain::encoding::Encoding;
use crate::domain::error::{StoreError, StoreResult};
use crate::domain::traits::FormatConverter;
use plist::Value;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::{fs, process};

/// Converts in process with the `plist` crate. Input encoding is auto-detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlistConverter;

impl FormatConverter for PlistConverter {
    async fn convert(&self, path: &Path, target: Encoding) -> StoreResult<()> {
        let bytes = fs::read(path).await.map_err(|source| StoreError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let value = Value::from_reader(Cursor::new(bytes))
            .map_err(|e| conversion_error(path, target, e))?;

        let mut out = Vec::new();
        match target {
            Encoding::Xml => value.to_writer_xml(&mut out),
            Encoding::Binary => value.to_writer_binary(&mut out),
        }
        .map_err(|e| conversion_error(path, target, e))?;

        fs::write(path, out)
            .await
            .map_err(|source| StoreError::Unwritable {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Shells out to macOS `plutil -convert`.
#[derive(Debug, Clone)]
pub struct PlutilConverter {
    program: PathBuf,
}

impl PlutilConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PlutilConverter {
    fn default() -> Self {
        Self::new("plutil")
    }
}

impl FormatConverter for PlutilConverter {
    async fn convert(&self, path: &Path, target: Encoding) -> StoreResult<()> {
        let output = process::Command::new(&self.program)
            .arg("-convert")
            .arg(target.plutil_format())
            .arg(path)
            .output()
            .await
            .map_err(|source| StoreError::ConverterUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(conversion_error(
            path,
            target,
            format!("{} exited with {}: {}", self.program.display(), output.status, stderr.trim()),
        ))
    }
}

/// Runtime-selected converter.
#[derive(Debug, Clone)]
pub enum Converter {
    Builtin(PlistConverter),
    Plutil(PlutilConverter),
}

impl FormatConverter for Converter {
    async fn convert(&self, path: &Path, target: Encoding) -> StoreResult<()> {
        match self {
            Converter::Builtin(c) => c.convert(path, target).await,
            Converter::Plutil(c) => c.convert(path, target).await,
        }
    }
}

fn conversion_error(path: &Path, target: Encoding, reason: impl ToString) -> StoreError {
    StoreError::Conversion {
        path: path.to_path_buf(),
        target,
        reason: reason.to_string(),
    }
}

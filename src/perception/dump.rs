use std::path::{Path, PathBuf};

use crate::config::CaptureConfig;
use crate::errors::{PilotError, PilotResult};

/// Writes each captured screenshot to `<dir>/<prefix><NNNN>.png` with a
/// monotonically increasing index. Files are never read back.
#[derive(Debug)]
pub struct ScreenshotDumper {
    dir: PathBuf,
    prefix: String,
    next_index: u32,
}

impl ScreenshotDumper {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, start_index: u32) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            next_index: start_index,
        }
    }

    pub fn from_config(cfg: &CaptureConfig) -> Self {
        Self::new(cfg.dump_dir.clone(), cfg.dump_prefix.clone(), cfg.dump_start)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Create the dump directory if absent.
    pub fn prepare(&self) -> PilotResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| PilotError::Dump {
            path: self.dir.clone(),
            source,
        })
    }

    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}{:04}.png", self.prefix, index))
    }

    /// Write `png` under the current index, then advance it. The index only
    /// moves on a successful write.
    pub fn write(&mut self, png: &[u8]) -> PilotResult<PathBuf> {
        let path = self.path_for(self.next_index);
        std::fs::write(&path, png).map_err(|source| PilotError::Dump {
            path: path.clone(),
            source,
        })?;
        self.next_index += 1;
        tracing::debug!(path = %path.display(), bytes = png.len(), "screenshot dumped");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded_and_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let mut dumper = ScreenshotDumper::new(dir.path().join("shots"), "screen_", 9);
        dumper.prepare().unwrap();

        let first = dumper.write(b"one").unwrap();
        let second = dumper.write(b"two").unwrap();

        assert_eq!(first.file_name().unwrap(), "screen_0009.png");
        assert_eq!(second.file_name().unwrap(), "screen_0010.png");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(dumper.next_index(), 11);
    }

    #[test]
    fn failed_write_keeps_index() {
        let dir = tempfile::tempdir().unwrap();
        // Directory never created.
        let mut dumper = ScreenshotDumper::new(dir.path().join("missing"), "s", 1);
        let err = dumper.write(b"png").unwrap_err();
        assert!(matches!(err, PilotError::Dump { .. }));
        assert_eq!(dumper.next_index(), 1);
    }

    #[test]
    fn prepare_fails_when_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let dumper = ScreenshotDumper::new(&file, "s", 1);
        assert!(matches!(dumper.prepare(), Err(PilotError::Dump { .. })));
    }
}

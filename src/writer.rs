//! Persisting generated artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::codegen::{Artifacts, DECLARATIONS_FILE, RUNTIME_FILE};
use crate::error::AuroResult;

/// Destination for generated artifacts.
pub trait ArtifactWriter {
    fn write(&self, artifacts: &Artifacts) -> AuroResult<()>;
}

/// Writes `types.rs` and `runtime.rs` into one directory.
///
/// Both files are staged next to their targets first, so a failed write
/// leaves the previous pair in place.
#[derive(Debug, Clone)]
pub struct FsWriter {
    dir: PathBuf,
}

impl FsWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn declarations_path(&self) -> PathBuf {
        self.dir.join(DECLARATIONS_FILE)
    }

    pub fn runtime_path(&self) -> PathBuf {
        self.dir.join(RUNTIME_FILE)
    }

    fn stage(&self, artifacts: &Artifacts) -> AuroResult<[(PathBuf, PathBuf); 2]> {
        fs::create_dir_all(&self.dir)?;

        let staged = [
            (staging_path(&self.declarations_path()), self.declarations_path()),
            (staging_path(&self.runtime_path()), self.runtime_path()),
        ];
        fs::write(&staged[0].0, &artifacts.declarations)?;
        fs::write(&staged[1].0, &artifacts.runtime)?;
        Ok(staged)
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl ArtifactWriter for FsWriter {
    fn write(&self, artifacts: &Artifacts) -> AuroResult<()> {
        let staged = match self.stage(artifacts) {
            Ok(staged) => staged,
            Err(e) => {
                for target in [self.declarations_path(), self.runtime_path()] {
                    let _ = fs::remove_file(staging_path(&target));
                }
                return Err(e);
            }
        };

        for (tmp, target) in &staged {
            fs::rename(tmp, target)?;
        }

        info!(dir = %self.dir.display(), "wrote generated artifacts");
        Ok(())
    }
}

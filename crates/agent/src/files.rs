use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

/// How much of an opened file is echoed back.
const OPEN_PREVIEW_CHARS: usize = 500;

/// File operations confined to one directory. Anything trying to step outside
/// (absolute paths, `..` components) is rejected before touching the
/// filesystem.
#[derive(Debug, Clone)]
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed creating file area {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn create(&self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        fs::write(&path, "").with_context(|| format!("failed creating {name}"))?;
        Ok(format!("Created file {name}."))
    }

    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        if !path.exists() {
            bail!("file not found");
        }
        let contents = fs::read_to_string(&path).with_context(|| format!("failed reading {name}"))?;

        if contents.is_empty() {
            return Ok(format!("{name} is empty."));
        }

        let preview: String = contents.chars().take(OPEN_PREVIEW_CHARS).collect();
        if preview.len() < contents.len() {
            Ok(format!("{name} starts with: {preview}..."))
        } else {
            Ok(format!("{name} contains: {preview}"))
        }
    }

    pub fn delete(&self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        if !path.exists() {
            bail!("file not found");
        }
        fs::remove_file(&path).with_context(|| format!("failed deleting {name}"))?;
        Ok(format!("Deleted {name}."))
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            bail!("no file name given");
        }

        let candidate = Path::new(name);
        let escapes = candidate.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if escapes {
            bail!("file name must stay inside the assistant's file area");
        }

        Ok(self.root.join(candidate))
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use super::snapshot::{self, Snapshot, SnapshotError};
use crate::icons::IconProvider;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: SnapshotError },
    SymlinkRefused { path: PathBuf },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "cannot read tree {path:?}: {source}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place without fsync.
    #[default]
    BestEffort,

    /// Additionally syncs the file and its directory where the platform allows it.
    Durable,
}

/// A skill tree persisted as a single JSON snapshot file.
#[derive(Debug, Clone)]
pub struct TreeFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl TreeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self, icons: &dyn IconProvider) -> Result<Snapshot, StoreError> {
        let json = fs::read_to_string(&self.path)
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        let snapshot = snapshot::deserialize(&json, icons)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        info!(path = %self.path.display(), elements = snapshot.elements.len(), "loaded skill tree");
        Ok(snapshot)
    }

    /// Like `load`, but a file that does not exist yet yields an empty tree.
    pub fn load_or_default(&self, icons: &dyn IconProvider) -> Result<Snapshot, StoreError> {
        match fs::metadata(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "tree file missing; starting empty");
                Ok(Snapshot::default())
            }
            _ => self.load(icons),
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = snapshot::serialize(snapshot)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        write_atomic(&self.path, json.as_bytes(), self.durability)?;
        debug!(path = %self.path.display(), "saved skill tree");
        Ok(())
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|source| StoreError::Io { path: parent.clone(), source })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: path.to_path_buf() });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    }

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path =
        parent.join(format!(".skilltree.tmp.{}.{}", file_name.to_string_lossy(), nanos));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

    file.write_all(contents).map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path: path.to_path_buf(), source });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(&parent)
                .map_err(|source| StoreError::Io { path: parent.clone(), source })?;
            dir.sync_all().map_err(|source| StoreError::Io { path: parent.clone(), source })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rstest::{fixture, rstest};

    use super::{StoreError, TreeFile, WriteDurability};
    use crate::icons::BuiltinIcons;
    use crate::model::fixtures::chain_abc;
    use crate::model::Mode;
    use crate::store::Snapshot;

    static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TempDir {
        path: std::path::PathBuf,
    }

    impl TempDir {
        fn new(prefix: &str) -> Self {
            let nanos =
                SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
            let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
            let mut path = env::temp_dir();
            path.push(format!("skilltree-{prefix}-{}-{nanos}-{counter}", std::process::id()));
            std::fs::create_dir_all(&path).unwrap();
            Self { path }
        }

        fn path(&self) -> &std::path::Path {
            &self.path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[fixture]
    fn tmp() -> TempDir {
        TempDir::new("tree-file")
    }

    #[rstest]
    #[case(WriteDurability::BestEffort)]
    #[case(WriteDurability::Durable)]
    fn save_then_load_round_trips(tmp: TempDir, #[case] durability: WriteDurability) {
        let file = TreeFile::new(tmp.path().join("nested").join("tree.json"))
            .with_durability(durability);
        let snapshot = Snapshot {
            elements: chain_abc(),
            tree_name: "Warrior".to_owned(),
            mode: Mode::Player,
            ..Snapshot::default()
        };

        file.save(&snapshot).expect("save");
        let loaded = file.load(&BuiltinIcons).expect("load");

        assert_eq!(loaded, snapshot);
        let leftovers = std::fs::read_dir(tmp.path().join("nested"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".skilltree.tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[rstest]
    fn missing_file_loads_as_default(tmp: TempDir) {
        let file = TreeFile::new(tmp.path().join("absent.json"));

        assert!(matches!(file.load(&BuiltinIcons), Err(StoreError::Io { .. })));
        assert_eq!(file.load_or_default(&BuiltinIcons).unwrap(), Snapshot::default());
    }

    #[rstest]
    fn corrupt_file_is_a_json_error(tmp: TempDir) {
        let path = tmp.path().join("tree.json");
        std::fs::write(&path, "{ nope").unwrap();

        let err = TreeFile::new(&path).load_or_default(&BuiltinIcons).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[cfg(unix)]
    #[rstest]
    fn refuses_to_write_through_symlink(tmp: TempDir) {
        let target = tmp.path().join("target.json");
        std::fs::write(&target, "{}").unwrap();
        let link = tmp.path().join("link.json");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = TreeFile::new(&link).save(&Snapshot::default()).unwrap_err();
        assert!(matches!(err, StoreError::SymlinkRefused { .. }));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
    }
}

use std::{fs, path::Path};

use tracing::debug;

use crate::error::{Error, Result};

use super::db::Db;
use super::object::tree::{Entry, Tree, EXECUTABLE_MODE};

/// Materializes `tree` under `path`, reading file contents from `db`.
///
/// Nothing is rolled back on failure; running it again overwrites whatever
/// an earlier run left behind.
pub fn checkout(db: &Db, tree: &Tree, path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(Error::filesystem(path))?;

    for entry in tree.entries() {
        let name = entry.name();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(Error::InvalidEntryName(name.to_owned()));
        }
        let item_path = path.join(name);

        match entry {
            Entry::SubTree { tree, .. } => checkout(db, tree, &item_path)?,
            Entry::File { mode, oid, .. } => {
                debug!(%oid, path = %item_path.display(), "checking out file");
                db.copy_blob(oid, &item_path)?;
                if mode == EXECUTABLE_MODE {
                    set_executable(&item_path)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .map_err(Error::filesystem(path))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions).map_err(Error::filesystem(path))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Hasher;
    use crate::repository::object::blob::Blob;
    use tempfile::TempDir;

    fn db(dir: &TempDir) -> Db {
        let db = Db::new(dir.path().join(".git"), Hasher::default());
        db.init().unwrap();
        db
    }

    #[test]
    fn writes_nested_files() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir);
        let a = db.store_object(&Blob::new("alpha\n")).unwrap();
        let b = db.store_object(&Blob::new("beta\n")).unwrap();
        let tree = Tree::new(vec![
            Entry::file("a.txt", a),
            Entry::sub_tree("sub", Tree::new(vec![Entry::file("b.txt", b)])),
        ]);

        let dest = dir.path().join("out");
        checkout(&db, &tree, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha\n");
        assert_eq!(fs::read_to_string(dest.join("sub/b.txt")).unwrap(), "beta\n");
    }

    #[test]
    fn missing_blob_aborts() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir);
        let missing = Hasher::default().digest(b"absent");
        let tree = Tree::new(vec![Entry::file("gone", missing)]);

        let err = checkout(&db, &tree, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[test]
    fn file_entry_must_point_at_blob() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir);
        let inner = db.store_object(&Tree::default()).unwrap();
        let tree = Tree::new(vec![Entry::file("not-a-file", inner)]);

        let dest = dir.path().join("out");
        let err = checkout(&db, &tree, &dest).unwrap_err();
        assert!(matches!(err, Error::CorruptObject { .. }));
        assert!(!dest.join("not-a-file").exists());
    }

    #[test]
    fn rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir);
        let oid = db.store_object(&Blob::new("x")).unwrap();

        for name in ["..", "../x", "a/b", ""] {
            let tree = Tree::new(vec![Entry::file(name, oid.clone())]);
            assert!(matches!(
                checkout(&db, &tree, &dir.path().join("out")),
                Err(Error::InvalidEntryName(_))
            ));
        }
    }

    #[cfg(unix)]
    #[test]
    fn executable_mode_sets_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let db = db(&dir);
        let oid = db.store_object(&Blob::new("#!/bin/sh\n")).unwrap();
        let tree = Tree::new(vec![Entry::File {
            mode: EXECUTABLE_MODE.to_owned(),
            name: "run.sh".to_owned(),
            oid,
        }]);

        let dest = dir.path().join("out");
        checkout(&db, &tree, &dest).unwrap();
        let mode = fs::metadata(dest.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

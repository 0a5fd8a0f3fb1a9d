use std::{env, path::Path, path::PathBuf};

use tracing::info;

use crate::error::Result;
use crate::hasher::{Hasher, DEFAULT_ALGORITHM, DEFAULT_ENCODING};
use crate::oid::Oid;
use db::{Db, RawObject};
use object::{
    blob::Blob,
    commit::{Commit, Signature},
    tree::{Entry, Tree, EXECUTABLE_MODE},
    Storable,
};
use workspace::Workspace;

pub mod checkout;
pub mod db;
pub mod object;
pub mod workspace;

pub const DEFAULT_VCS_DIR: &str = ".git";

pub struct ConfigUser {
    pub name: String,
    pub email: String,
}

impl ConfigUser {
    pub fn identity(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

pub struct Config {
    pub user: ConfigUser,
    pub timezone: String,
    pub vcs_dir: String,
    pub algorithm: String,
    pub encoding: String,
}

fn env_or_default(key: &str) -> String {
    env::var_os(key)
        .map(|var| var.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn env_or(key: &str, default: &str) -> String {
    Some(env_or_default(key))
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: ConfigUser {
                name: String::new(),
                email: String::new(),
            },
            timezone: "Local".to_owned(),
            vcs_dir: DEFAULT_VCS_DIR.to_owned(),
            algorithm: DEFAULT_ALGORITHM.to_owned(),
            encoding: DEFAULT_ENCODING.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let name = env_or_default("GIT_AUTHOR_NAME");
        let email = env_or_default("GIT_AUTHOR_EMAIL");

        Self {
            user: ConfigUser { name, email },
            timezone: env_or("LOOSEGIT_TZ", "Local"),
            vcs_dir: env_or("LOOSEGIT_DIR", DEFAULT_VCS_DIR),
            algorithm: env_or("LOOSEGIT_ALGORITHM", DEFAULT_ALGORITHM),
            encoding: env_or("LOOSEGIT_ENCODING", DEFAULT_ENCODING),
        }
    }
}

pub struct Repository {
    root: PathBuf,
    workspace: Workspace,
    db: Db,
    config: Config,
}

impl Repository {
    /// Fails only if the configured digest algorithm is unknown.
    pub fn open(path: PathBuf, config: Config) -> Result<Self> {
        let hasher = Hasher::new(&config.algorithm, &config.encoding)?;
        let db_path = path.join(&config.vcs_dir);

        Ok(Self {
            workspace: Workspace::new(path.clone(), config.vcs_dir.clone()),
            db: Db::new(db_path, hasher),
            root: path,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn hasher(&self) -> &Hasher {
        self.db.hasher()
    }

    pub fn init(&self) -> Result<()> {
        self.db.init()?;
        info!(root = %self.root.display(), "initialized object database");
        Ok(())
    }

    /// Hashes a workspace file as a blob, storing it when `write` is set.
    pub fn hash_object(&self, path: &Path, write: bool) -> Result<Oid> {
        let blob = Blob::new(self.workspace.read_file(path)?);
        if write {
            self.db.store_object(&blob)
        } else {
            blob.oid(self.hasher())
        }
    }

    /// Builds a tree from the workspace without storing anything.
    pub fn build_tree(&self) -> Result<Tree> {
        self.build_tree_at(&self.root, false)
    }

    /// Stores every workspace file and directory and returns the root tree id.
    pub fn write_tree(&self) -> Result<Oid> {
        let tree = self.build_tree_at(&self.root, true)?;
        let oid = self.db.store_tree(&tree)?;
        info!(%oid, entries = tree.entries().len(), "wrote tree");
        Ok(oid)
    }

    fn build_tree_at(&self, dir: &Path, store: bool) -> Result<Tree> {
        let mut tree = Tree::default();

        for entry in self.workspace.list_dir(dir)? {
            if entry.is_dir {
                let subtree = self.build_tree_at(&entry.path, store)?;
                if !subtree.is_empty() {
                    tree.push(Entry::sub_tree(entry.name, subtree));
                }
                continue;
            }

            let oid = self.hash_object(&entry.path, store)?;
            let file = if entry.executable {
                Entry::File {
                    mode: EXECUTABLE_MODE.to_owned(),
                    name: entry.name,
                    oid,
                }
            } else {
                Entry::file(entry.name, oid)
            };
            tree.push(file);
        }

        Ok(tree)
    }

    pub fn commit_tree(&self, tree: Oid, parents: Vec<Oid>, message: &str) -> Result<Oid> {
        let author = Signature::now(self.config.user.identity(), self.config.timezone.clone());
        let commit = Commit::builder(tree, author)
            .parents(parents)
            .message(message)
            .build();

        let oid = self.db.store_object(&commit)?;
        info!(%oid, parents = commit.parents().len(), "wrote commit");
        Ok(oid)
    }

    pub fn cat_file(&self, oid: &Oid) -> Result<RawObject> {
        self.db.read_object(oid)
    }

    /// Materializes `tree` under `path`; file contents come from this
    /// repository's loose objects.
    pub fn checkout(&self, tree: &Tree, path: &Path) -> Result<()> {
        checkout::checkout(&self.db, tree, path)?;
        info!(path = %path.display(), "checked out tree");
        Ok(())
    }

    pub fn checkout_oid(&self, oid: &Oid, path: &Path) -> Result<()> {
        let tree = self.db.read_tree(oid)?;
        self.checkout(&tree, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn repository(dir: &TempDir) -> Repository {
        let config = Config {
            user: ConfigUser {
                name: "Montoya Edu".to_owned(),
                email: "montoya.edu@gmail.com".to_owned(),
            },
            timezone: "GMT+2".to_owned(),
            ..Config::default()
        };
        let repository = Repository::open(dir.path().to_path_buf(), config).unwrap();
        repository.init().unwrap();
        repository
    }

    #[test]
    fn open_rejects_unknown_algorithm() {
        let config = Config {
            algorithm: "Pippo".to_owned(),
            ..Config::default()
        };
        assert!(matches!(
            Repository::open(PathBuf::from("."), config),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn write_tree_matches_fixture() {
        let dir = TempDir::new().unwrap();
        let repository = repository(&dir);
        fs::write(dir.path().join("pippo"), "Hello World!\n\n").unwrap();
        fs::write(dir.path().join("pluto"), "Hello World!\n\n").unwrap();

        let oid = repository.write_tree().unwrap();
        assert_eq!(oid.to_string(), "a48464603b7d2519a92794f59232caeda2c829f6");
        assert_eq!(repository.build_tree().unwrap().entries().len(), 2);
    }

    #[test]
    fn hash_object_only_writes_when_asked() {
        let dir = TempDir::new().unwrap();
        let repository = repository(&dir);
        fs::write(dir.path().join("pippo"), "Hello World!\n\n").unwrap();

        let oid = repository.hash_object(Path::new("pippo"), false).unwrap();
        assert_eq!(oid.to_string(), "ea2fd5c3fa7abbc3b05bade4a1c9ea0a5c3f1758");
        assert!(!repository.db().exists(&oid));

        repository.hash_object(Path::new("pippo"), true).unwrap();
        assert!(repository.db().exists(&oid));
    }

    #[test]
    fn commit_then_checkout_by_id() {
        let dir = TempDir::new().unwrap();
        let repository = repository(&dir);
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.txt"), "body\n").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let tree = repository.write_tree().unwrap();
        let commit = repository.commit_tree(tree.clone(), vec![], "Initial").unwrap();
        let raw = repository.cat_file(&commit).unwrap();
        let text = String::from_utf8(raw.body).unwrap();
        assert!(text.starts_with(&format!("tree {tree}\nauthor Montoya Edu <montoya.edu@gmail.com> ")));
        assert!(text.ends_with(" +0200\n\nInitial\n"));

        let dest = dir.path().join("copy");
        repository.checkout_oid(&tree, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("src/main.txt")).unwrap(), "body\n");
        assert!(!dest.join("empty").exists());
    }
}

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use flate2::{write::ZlibEncoder, Compression};
use rand::distributions::{Alphanumeric, DistString};
use tracing::debug;

use crate::compress;
use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::oid::Oid;

use super::object::{
    tree::{Entry, Tree, DIRECTORY_MODE},
    DbObject, ObjectKind, Storable,
};

/// A decompressed loose object split into kind and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectKind,
    pub body: Vec<u8>,
}

/// Loose-object database rooted at `<repo>/<vcs-dir>`.
pub struct Db {
    root: PathBuf,
    hasher: Hasher,
}

impl Db {
    fn objects_path(&self) -> PathBuf {
        self.root.join("objects")
    }

    pub fn new(db_path: PathBuf, hasher: Hasher) -> Self {
        Self {
            root: db_path,
            hasher,
        }
    }

    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    pub fn init(&self) -> Result<()> {
        let objects = self.objects_path();
        fs::create_dir_all(&objects).map_err(Error::filesystem(objects))
    }

    /// `objects/<first two hex chars>/<remaining hex chars>`
    pub fn object_path(&self, oid: &Oid) -> PathBuf {
        let (group, rest) = oid.split_path();
        self.objects_path().join(group).join(rest)
    }

    pub fn exists(&self, oid: &Oid) -> bool {
        self.object_path(oid).is_file()
    }

    pub fn store_object(&self, object: &impl Storable) -> Result<Oid> {
        let db_object = DbObject::new(object, &self.hasher)?;
        self.write_object(&db_object)?;
        Ok(db_object.oid().clone())
    }

    /// Stores every nested tree before the tree that references it.
    pub fn store_tree(&self, tree: &Tree) -> Result<Oid> {
        let mut root = None;
        tree.traverse(&mut |subtree| {
            root = Some(self.store_object(subtree)?);
            Ok(())
        })?;
        match root {
            Some(oid) => Ok(oid),
            None => self.store_object(tree),
        }
    }

    pub fn write_object(&self, object: &DbObject) -> Result<()> {
        let object_path = self.object_path(object.oid());
        if object_path.is_file() {
            debug!(oid = %object.oid(), "object already stored");
            return Ok(());
        }

        let group_path = object_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.objects_path());
        fs::create_dir_all(&group_path).map_err(Error::filesystem(&group_path))?;

        let temp_path = group_path.join(generate_temp_name());
        let file = File::create_new(&temp_path).map_err(Error::filesystem(&temp_path))?;

        let written = write_compressed(file, object.data()).and_then(|()| {
            fs::rename(&temp_path, &object_path).map_err(Error::filesystem(&object_path))
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        debug!(oid = %object.oid(), size = object.data().len(), "stored object");

        Ok(())
    }

    pub fn read_object(&self, oid: &Oid) -> Result<RawObject> {
        let path = self.object_path(oid);
        let packed = fs::read(&path).map_err(Error::filesystem(&path))?;
        let data = compress::decompress(&packed)?;
        if &self.hasher.digest(&data) != oid {
            return Err(Error::corrupt(oid, "content does not match id"));
        }

        let nul = data
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::corrupt(oid, "missing header terminator"))?;
        let header = compress::parse_header(&data[..nul])?;
        let kind = header.kind.parse::<ObjectKind>()?;
        let body = data[nul + 1..].to_vec();

        if body.len() as u64 != header.len {
            return Err(Error::corrupt(
                oid,
                format!("header declares {} bytes, found {}", header.len, body.len()),
            ));
        }
        debug!(%oid, %kind, size = body.len(), "read object");

        Ok(RawObject { kind, body })
    }

    /// Loads a stored tree, resolving sub-trees recursively.
    pub fn read_tree(&self, oid: &Oid) -> Result<Tree> {
        let raw = self.read_object(oid)?;
        if raw.kind != ObjectKind::Tree {
            return Err(Error::corrupt(oid, format!("expected tree, got {}", raw.kind)));
        }

        let digest_len = self.hasher.digest_len();
        let mut tree = Tree::default();
        let mut rest = raw.body.as_slice();

        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|b| *b == b' ')
                .ok_or_else(|| Error::corrupt(oid, "tree entry has no mode"))?;
            let nul = rest
                .iter()
                .position(|b| *b == 0)
                .filter(|nul| *nul > space)
                .ok_or_else(|| Error::corrupt(oid, "tree entry has no name"))?;
            if rest.len() < nul + 1 + digest_len {
                return Err(Error::corrupt(oid, "tree entry digest is truncated"));
            }

            let text = |bytes: &[u8]| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| Error::corrupt(oid, "tree entry is not valid text"))
            };
            let mode = text(&rest[..space])?;
            let name = text(&rest[space + 1..nul])?;
            let entry_oid = Oid::from_bytes(&rest[nul + 1..nul + 1 + digest_len]);
            rest = &rest[nul + 1 + digest_len..];

            let entry = if mode.trim_start_matches('0') == DIRECTORY_MODE {
                Entry::SubTree {
                    tree: self.read_tree(&entry_oid)?,
                    mode,
                    name,
                }
            } else {
                Entry::File {
                    mode,
                    name,
                    oid: entry_oid,
                }
            };
            tree.push(entry);
        }

        Ok(tree)
    }

    /// Streams the body of a loose blob into the file at `dest`. The file is
    /// not created when the object is of another kind.
    pub fn copy_blob(&self, oid: &Oid, dest: &Path) -> Result<()> {
        let source = self.object_path(oid);
        let file = File::open(&source).map_err(Error::filesystem(&source))?;

        let (header, mut body) = compress::open_loose(BufReader::new(file))?;
        if header.kind != ObjectKind::Blob.as_str() {
            return Err(Error::corrupt(oid, format!("expected blob, got {}", header.kind)));
        }

        let out = File::create(dest).map_err(Error::filesystem(dest))?;
        let mut writer = BufWriter::new(out);
        compress::copy_body(&header, &mut body, &mut writer)
    }
}

fn write_compressed(file: File, data: &[u8]) -> Result<()> {
    let mut encoder = ZlibEncoder::new(file, Compression::default());
    encoder.write_all(data).map_err(Error::Compression)?;
    encoder.finish().map_err(Error::Compression)?;
    Ok(())
}

fn generate_temp_name() -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 6);
    format!("tmp_obj_{suffix}")
}

use std::fmt::Display;
use std::str::FromStr;

use blob::Blob;
use commit::Commit;
use tree::Tree;

use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::oid::Oid;

pub mod blob;
pub mod commit;
pub mod tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(Error::UnsupportedObjectType(other.to_owned())),
        }
    }
}

/// Writes `<kind> <len>\0`. The header is always ASCII, whatever the
/// configured text encoding.
pub(crate) fn write_header(out: &mut Vec<u8>, kind: ObjectKind, len: usize) {
    out.extend_from_slice(kind.as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(len.to_string().as_bytes());
    out.push(0);
}

/// Something with a canonical serialization and therefore an identity.
pub trait Storable {
    fn kind(&self) -> ObjectKind;

    /// Body bytes, without the header.
    fn to_bytes(&self, hasher: &Hasher) -> Result<Vec<u8>>;

    /// Header followed by body.
    fn serialize(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        let body = self.to_bytes(hasher)?;
        let mut content = Vec::with_capacity(body.len() + 16);
        write_header(&mut content, self.kind(), body.len());
        content.extend_from_slice(&body);
        Ok(content)
    }

    fn oid(&self, hasher: &Hasher) -> Result<Oid> {
        Ok(hasher.digest(&self.serialize(hasher)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
}

impl Storable for Object {
    fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(blob) => blob.kind(),
            Object::Tree(tree) => tree.kind(),
            Object::Commit(commit) => commit.kind(),
        }
    }

    fn to_bytes(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        match self {
            Object::Blob(blob) => blob.to_bytes(hasher),
            Object::Tree(tree) => tree.to_bytes(hasher),
            Object::Commit(commit) => commit.to_bytes(hasher),
        }
    }

    fn serialize(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        match self {
            Object::Blob(blob) => blob.serialize(hasher),
            Object::Tree(tree) => tree.serialize(hasher),
            Object::Commit(commit) => commit.serialize(hasher),
        }
    }
}

/// An object in its canonical serialized form, ready to be written.
#[derive(Debug, Clone)]
pub struct DbObject {
    data: Vec<u8>,
    oid: Oid,
}

impl DbObject {
    pub fn new(object: &impl Storable, hasher: &Hasher) -> Result<Self> {
        let data = object.serialize(hasher)?;
        let oid = hasher.digest(&data);
        Ok(Self { data, oid })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }
}

impl From<Commit> for Object {
    fn from(value: Commit) -> Self {
        Self::Commit(value)
    }
}

impl From<Tree> for Object {
    fn from(value: Tree) -> Self {
        Self::Tree(value)
    }
}

impl From<Blob> for Object {
    fn from(value: Blob) -> Self {
        Self::Blob(value)
    }
}

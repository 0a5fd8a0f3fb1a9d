use super::{write_header, ObjectKind, Storable};
use crate::error::Result;
use crate::hasher::Hasher;
use crate::oid::Oid;

pub const REGULAR_MODE: &str = "100644";
pub const EXECUTABLE_MODE: &str = "100755";
pub const DIRECTORY_MODE: &str = "40000";

/// A named, moded reference held by a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File {
        mode: String,
        name: String,
        oid: Oid,
    },
    /// Owns the nested tree; its digest is derived from it on demand.
    SubTree {
        mode: String,
        name: String,
        tree: Tree,
    },
}

impl Entry {
    pub fn file(name: impl Into<String>, oid: Oid) -> Self {
        Self::File {
            mode: REGULAR_MODE.to_owned(),
            name: name.into(),
            oid,
        }
    }

    pub fn sub_tree(name: impl Into<String>, tree: Tree) -> Self {
        Self::SubTree {
            mode: DIRECTORY_MODE.to_owned(),
            name: name.into(),
            tree,
        }
    }

    pub fn mode(&self) -> &str {
        match self {
            Self::File { mode, .. } | Self::SubTree { mode, .. } => mode,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::SubTree { name, .. } => name,
        }
    }

    pub fn oid(&self, hasher: &Hasher) -> Result<Oid> {
        match self {
            Self::File { oid, .. } => Ok(oid.clone()),
            Self::SubTree { tree, .. } => tree.oid(hasher),
        }
    }

    /// `<mode> <name>\0` followed by the raw digest.
    fn len(&self, hasher: &Hasher) -> Result<usize> {
        let mode = hasher.encode_text(self.mode())?;
        let name = hasher.encode_text(self.name())?;
        Ok(mode.len() + name.len() + 2 + hasher.digest_len())
    }

    fn write(&self, out: &mut Vec<u8>, hasher: &Hasher) -> Result<()> {
        let oid = self.oid(hasher)?;
        hasher.check_len(&oid)?;

        out.extend_from_slice(&hasher.encode_text(self.mode())?);
        out.push(b' ');
        out.extend_from_slice(&hasher.encode_text(self.name())?);
        out.push(0);
        out.extend_from_slice(oid.as_bytes());
        Ok(())
    }
}

/// Ordered entries; insertion order is serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<Entry>,
}

impl Tree {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn body_len(&self, hasher: &Hasher) -> Result<usize> {
        self.entries
            .iter()
            .try_fold(0usize, |total, entry| -> Result<usize> {
                Ok(total + entry.len(hasher)?)
            })
    }

    /// Visits nested trees depth first, children before their parent.
    pub fn traverse<F>(&self, f: &mut F) -> Result<()>
    where
        F: FnMut(&Tree) -> Result<()>,
    {
        for entry in &self.entries {
            if let Entry::SubTree { tree, .. } = entry {
                tree.traverse(f)?;
            }
        }
        f(self)
    }
}

impl Storable for Tree {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tree
    }

    fn to_bytes(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        let mut body = Vec::with_capacity(self.body_len(hasher)?);
        for entry in &self.entries {
            entry.write(&mut body, hasher)?;
        }
        Ok(body)
    }

    fn serialize(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        let len = self.body_len(hasher)?;
        let mut content = Vec::with_capacity(len + 16);
        write_header(&mut content, ObjectKind::Tree, len);
        for entry in &self.entries {
            entry.write(&mut content, hasher)?;
        }
        Ok(content)
    }
}

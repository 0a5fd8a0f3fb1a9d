use super::{ObjectKind, Storable};
use crate::error::Result;
use crate::hasher::Hasher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: String,
}

impl Blob {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Storable for Blob {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Blob
    }

    fn to_bytes(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        hasher.encode_text(&self.content)
    }
}

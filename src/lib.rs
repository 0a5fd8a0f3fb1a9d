//! Content-addressed blob, tree and commit objects with git's canonical
//! serialization, zlib loose-object storage and tree checkout.

pub mod compress;
pub mod error;
pub mod hasher;
pub mod oid;
pub mod repository;

pub use error::{Error, Result};
pub use hasher::Hasher;
pub use oid::Oid;
pub use repository::object::{
    blob::Blob,
    commit::{Commit, CommitBuilder, Signature},
    tree::{Entry, Tree},
    DbObject, Object, ObjectKind, Storable,
};
pub use repository::{Config, Repository};

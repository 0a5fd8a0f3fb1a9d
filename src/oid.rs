use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::error::Error;

/// Byte lengths of the supported digests: SHA-1 and SHA-256.
const DIGEST_LENS: [usize; 2] = [20, 32];

/// Raw digest of an object's canonical serialization.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    hash: Vec<u8>,
}

impl Oid {
    pub fn from_bytes(hash: impl Into<Vec<u8>>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }

    /// Directory and file name of the loose object, e.g. `("ea", "2fd5...")`.
    pub fn split_path(&self) -> (String, String) {
        let hex = self.to_string();
        let (group, rest) = hex.split_at(2.min(hex.len()));
        (group.to_owned(), rest.to_owned())
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oid({})", base16ct::lower::encode_string(&self.hash))
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", base16ct::lower::encode_string(&self.hash))
    }
}

impl From<Oid> for String {
    fn from(value: Oid) -> Self {
        value.to_string()
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match hex::decode(trimmed) {
            Ok(hash) if DIGEST_LENS.contains(&hash.len()) => Ok(Self { hash }),
            _ => Err(Error::InvalidOid(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_every_byte_to_two_digits() {
        let oid = Oid::from_bytes(vec![0x05, 0x00, 0xab, 0x10]);
        assert_eq!(oid.to_string(), "0500ab10");
    }

    #[test]
    fn parses_hex_and_splits_loose_path() {
        let oid: Oid = "ea2fd5c3fa7abbc3b05bade4a1c9ea0a5c3f1758".parse().unwrap();
        assert_eq!(oid.len(), 20);
        let (group, rest) = oid.split_path();
        assert_eq!(group, "ea");
        assert_eq!(rest, "2fd5c3fa7abbc3b05bade4a1c9ea0a5c3f1758");
    }

    #[test]
    fn accepts_uppercase_and_trailing_newline() {
        let oid: Oid = "EA2FD5C3FA7ABBC3B05BADE4A1C9EA0A5C3F1758\n".parse().unwrap();
        assert_eq!(oid.to_string(), "ea2fd5c3fa7abbc3b05bade4a1c9ea0a5c3f1758");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!("xyz".parse::<Oid>(), Err(Error::InvalidOid(_))));
        assert!(matches!("".parse::<Oid>(), Err(Error::InvalidOid(_))));
        assert!(matches!("abc".parse::<Oid>(), Err(Error::InvalidOid(_))));
    }

    #[test]
    fn rejects_truncated_ids() {
        assert!(matches!("ab".parse::<Oid>(), Err(Error::InvalidOid(_))));
        assert!(matches!(
            "ea2fd5c3fa7abbc3b05bade4a1c9ea0a5c3f17".parse::<Oid>(),
            Err(Error::InvalidOid(_))
        ));
        let sha256 = "374c6fbd7d106165b2215e5e263e70d6a760c67fa77e401188507bccde7ad905";
        assert_eq!(sha256.parse::<Oid>().unwrap().len(), 32);
    }
}

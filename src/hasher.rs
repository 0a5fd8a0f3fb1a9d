use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::error::{Error, Result};
use crate::oid::Oid;

pub const DEFAULT_ALGORITHM: &str = "sha1";
pub const DEFAULT_ENCODING: &str = "utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha1,
    Sha256,
}

impl Algorithm {
    pub fn from_name(name: &str) -> Result<Self> {
        match normalize(name).as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            _ => Err(Error::UnsupportedAlgorithm(name.to_owned())),
        }
    }

    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16Be,
    Utf16Le,
}

impl Encoding {
    fn from_name(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "utf8" => Some(Self::Utf8),
            "ascii" | "usascii" => Some(Self::Ascii),
            "iso88591" | "latin1" => Some(Self::Latin1),
            "utf16be" => Some(Self::Utf16Be),
            "utf16le" => Some(Self::Utf16Le),
            _ => None,
        }
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }
}

/// Lowercases and strips separators so `SHA-1`, `sha1` and `Sha_1` compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Digest algorithm and text encoding, fixed at construction and shared by
/// every serialization and hash computed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hasher {
    algorithm: Algorithm,
    encoding: String,
}

impl Default for Hasher {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha1,
            encoding: DEFAULT_ENCODING.to_owned(),
        }
    }
}

impl Hasher {
    /// Fails with `UnsupportedAlgorithm` for an unknown algorithm. The
    /// encoding is only checked when text is encoded.
    pub fn new(algorithm: &str, encoding: &str) -> Result<Self> {
        Ok(Self {
            algorithm: Algorithm::from_name(algorithm)?,
            encoding: encoding.to_owned(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn digest_len(&self) -> usize {
        self.algorithm.output_len()
    }

    pub fn digest(&self, data: &[u8]) -> Oid {
        Oid::from_bytes(self.algorithm.digest(data))
    }

    /// Fails unless `oid` is as long as this hasher's digests.
    pub fn check_len(&self, oid: &Oid) -> Result<()> {
        if oid.len() == self.digest_len() {
            Ok(())
        } else {
            Err(Error::DigestLength {
                oid: oid.clone(),
                expected: self.digest_len(),
            })
        }
    }

    pub fn hex(&self, digest: &[u8]) -> String {
        base16ct::lower::encode_string(digest)
    }

    pub fn encode_text(&self, text: &str) -> Result<Vec<u8>> {
        Encoding::from_name(&self.encoding)
            .map(|encoding| encoding.encode(text))
            .ok_or_else(|| Error::UnsupportedEncoding(self.encoding.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sha1_utf8() {
        let hasher = Hasher::default();
        assert_eq!(hasher.algorithm(), Algorithm::Sha1);
        assert_eq!(hasher.encoding(), "utf-8");
        assert_eq!(hasher.digest_len(), 20);
    }

    #[test]
    fn digest_matches_known_vector() {
        let hasher = Hasher::default();
        let oid = hasher.digest(b"blob 0\0");
        assert_eq!(oid.to_string(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn algorithm_names_are_lenient() {
        for name in ["SHA1", "sha-1", "Sha1"] {
            assert_eq!(Algorithm::from_name(name).unwrap(), Algorithm::Sha1);
        }
        assert_eq!(Algorithm::from_name("SHA-256").unwrap(), Algorithm::Sha256);
        assert_eq!(Hasher::new("sha256", "utf-8").unwrap().digest_len(), 32);
    }

    #[test]
    fn unknown_algorithm_fails_construction() {
        let err = Hasher::new("Pippo", "utf-8").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(ref name) if name == "Pippo"));
    }

    #[test]
    fn unknown_encoding_fails_on_encode() {
        let hasher = Hasher::new("SHA1", "Pippo").unwrap();
        let err = hasher.encode_text("Pluto").unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(ref name) if name == "Pippo"));
    }

    #[test]
    fn check_len_compares_against_algorithm() {
        let sha1_oid = Hasher::default().digest(b"x");
        assert!(Hasher::default().check_len(&sha1_oid).is_ok());

        let sha256 = Hasher::new("sha256", "utf-8").unwrap();
        let err = sha256.check_len(&sha1_oid).unwrap_err();
        assert!(matches!(err, Error::DigestLength { expected: 32, .. }));
    }

    #[test]
    fn hex_pads_single_digit_bytes() {
        let hasher = Hasher::default();
        assert_eq!(hasher.hex(&[0x05, 0x0f, 0xff]), "050fff");
        assert_eq!(hasher.hex(&[]), "");
    }

    #[test]
    fn encodes_text_per_encoding() {
        let text = "h\u{e9}\u{20ac}";
        let utf8 = Hasher::new("sha1", "UTF-8").unwrap();
        assert_eq!(utf8.encode_text(text).unwrap(), text.as_bytes());

        let latin1 = Hasher::new("sha1", "ISO-8859-1").unwrap();
        assert_eq!(latin1.encode_text(text).unwrap(), vec![b'h', 0xe9, b'?']);

        let ascii = Hasher::new("sha1", "US-ASCII").unwrap();
        assert_eq!(ascii.encode_text(text).unwrap(), b"h??".to_vec());

        let utf16 = Hasher::new("sha1", "UTF-16BE").unwrap();
        assert_eq!(utf16.encode_text("A").unwrap(), vec![0x00, 0x41]);
    }
}

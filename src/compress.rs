use std::io::{self, BufRead, BufReader, Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::error::{Error, Result};

/// Header of a loose object: `<kind> <len>\0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseHeader {
    pub kind: String,
    pub len: u64,
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(Error::Compression)?;
    encoder.finish().map_err(Error::Compression)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut decoded)
        .map_err(Error::Compression)?;
    Ok(decoded)
}

fn invalid(reason: &str) -> Error {
    Error::Compression(io::Error::new(io::ErrorKind::InvalidData, reason.to_owned()))
}

/// Parses `<kind> <len>` (without the terminator).
pub fn parse_header(raw: &[u8]) -> Result<LooseHeader> {
    let text = std::str::from_utf8(raw).map_err(|_| invalid("object header is not text"))?;
    let (kind, len) = text
        .split_once(' ')
        .ok_or_else(|| invalid("object header has no length"))?;
    let len = len
        .parse::<u64>()
        .map_err(|_| invalid("object header length is not a number"))?;
    Ok(LooseHeader {
        kind: kind.to_owned(),
        len,
    })
}

/// Inflating reader positioned at the start of a loose object's body and
/// limited to the length its header declares.
pub type LooseBody<R> = io::Take<BufReader<ZlibDecoder<R>>>;

/// Inflates `source` far enough to consume the header up to its NUL
/// terminator.
pub fn open_loose<R: Read>(source: R) -> Result<(LooseHeader, LooseBody<R>)> {
    let mut reader = BufReader::new(ZlibDecoder::new(source));

    let mut raw = Vec::new();
    reader
        .read_until(0, &mut raw)
        .map_err(Error::Compression)?;
    if raw.pop() != Some(0) {
        return Err(invalid("object header is not terminated"));
    }
    let header = parse_header(&raw)?;

    let body = reader.take(header.len);
    Ok((header, body))
}

/// Copies a body opened with [`open_loose`], failing if it ends early.
pub fn copy_body<R: Read, W: Write>(header: &LooseHeader, body: &mut R, dest: &mut W) -> Result<()> {
    let copied = io::copy(body, dest).map_err(Error::Compression)?;
    if copied != header.len {
        return Err(invalid("object body is shorter than its header declares"));
    }
    dest.flush().map_err(Error::Compression)
}

/// Streams exactly the declared body of a loose object into `dest`.
pub fn inflate_body<R: Read, W: Write>(source: R, dest: &mut W) -> Result<LooseHeader> {
    let (header, mut body) = open_loose(source)?;
    copy_body(&header, &mut body, dest)?;
    Ok(header)
}

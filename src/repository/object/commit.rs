use chrono::{FixedOffset, Local, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use super::{ObjectKind, Storable};
use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::oid::Oid;

/// Resolves a timezone name to its current UTC offset.
///
/// Accepts `UTC`, `GMT`, `Z`, `Local`, custom ids such as `GMT+2`,
/// `GMT-05:30`, `UTC+0100` or a bare `+0200`, and tz database regions such
/// as `Europe/Rome`.
pub fn resolve_timezone(name: &str) -> Result<FixedOffset> {
    if let Some(offset) = custom_offset(name) {
        return Ok(offset);
    }

    let region = name
        .trim()
        .parse::<Tz>()
        .map_err(|_| Error::UnknownTimezone(name.to_owned()))?;
    Ok(region.offset_from_utc_datetime(&Utc::now().naive_utc()).fix())
}

fn custom_offset(name: &str) -> Option<FixedOffset> {
    let upper = name.trim().to_ascii_uppercase();

    match upper.as_str() {
        "UTC" | "GMT" | "UT" | "Z" => return FixedOffset::east_opt(0),
        "LOCAL" => return Some(*Local::now().offset()),
        _ => {}
    }

    let rest = ["GMT", "UTC", "UT"]
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .unwrap_or(upper.as_str());

    let (sign, digits) = match rest.chars().next()? {
        '+' => (1, &rest[1..]),
        '-' => (-1, &rest[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) if minutes.len() == 2 => (hours, minutes),
        Some(_) => return None,
        None if digits.len() <= 2 => (digits, "0"),
        None if digits.len() <= 4 => digits.split_at(digits.len() - 2),
        None => return None,
    };

    let number = |part: &str| -> Option<i32> {
        if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    let hours = number(hours).filter(|h| *h <= 23)?;
    let minutes = number(minutes).filter(|m| *m <= 59)?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Formats a timezone's offset as `±HHMM`.
pub fn format_offset(timezone: &str) -> Result<String> {
    let offset = resolve_timezone(timezone)?;
    Ok(Utc::now().with_timezone(&offset).format("%z").to_string())
}

/// Identity plus the moment it acted, e.g. `Name <mail> 1496830486 +0200`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    identity: String,
    timestamp: i64,
    timezone: String,
}

impl Signature {
    pub fn new(identity: impl Into<String>, timestamp: i64, timezone: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            timestamp,
            timezone: timezone.into(),
        }
    }

    pub fn now(identity: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self::new(identity, Local::now().timestamp(), timezone)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn string(&self) -> Result<String> {
        Ok(format!(
            "{} {} {}",
            self.identity,
            self.timestamp,
            format_offset(&self.timezone)?
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    tree: Oid,
    parents: Vec<Oid>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl Commit {
    pub fn new(
        tree: Oid,
        parents: Vec<Oid>,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parents,
            author,
            committer,
            message: message.into(),
        }
    }

    /// Starts a commit whose committer defaults to the author.
    pub fn builder(tree: Oid, author: Signature) -> CommitBuilder {
        CommitBuilder {
            tree,
            parents: Vec::new(),
            committer: author.clone(),
            author,
            message: String::new(),
        }
    }

    pub fn tree(&self) -> &Oid {
        &self.tree
    }

    pub fn parents(&self) -> &[Oid] {
        &self.parents
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Storable for Commit {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Commit
    }

    fn to_bytes(&self, hasher: &Hasher) -> Result<Vec<u8>> {
        hasher.check_len(&self.tree)?;
        for parent in &self.parents {
            hasher.check_len(parent)?;
        }

        let mut text = format!("tree {}\n", self.tree);
        for parent in &self.parents {
            text.push_str(&format!("parent {parent}\n"));
        }
        text.push_str(&format!("author {}\n", self.author.string()?));
        text.push_str(&format!("committer {}\n", self.committer.string()?));
        text.push('\n');
        text.push_str(&self.message);
        text.push('\n');

        hasher.encode_text(&text)
    }
}

/// Mutable build-up phase of a [`Commit`].
#[derive(Debug, Clone)]
pub struct CommitBuilder {
    tree: Oid,
    parents: Vec<Oid>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl CommitBuilder {
    pub fn parent(mut self, parent: Oid) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn parents(mut self, parents: impl IntoIterator<Item = Oid>) -> Self {
        self.parents.extend(parents);
        self
    }

    pub fn committer(mut self, committer: Signature) -> Self {
        self.committer = committer;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn build(self) -> Commit {
        Commit::new(
            self.tree,
            self.parents,
            self.author,
            self.committer,
            self.message,
        )
    }
}

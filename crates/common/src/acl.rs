//! Access-control entries and their textual forms.
//!
//! The accepted text format is `scheme:id:perm[,scheme:id:perm...]`, with the
//! digest variant `digest:user:pwdhash:perm` whose identity itself contains a
//! colon. `perm` is either a number (clamped to 31) or a run of letters drawn
//! from `r`, `w`, `c`, `d` and `a`.
//!
//! Rendering always emits the letters in `c d r w a` order.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

pub const DIGEST_SCHEME: &str = "digest";
pub const WORLD_SCHEME: &str = "world";
pub const ANYONE_ID: &str = "anyone";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AclParseError {
    #[error("invalid ACL string specified: unknown permission '{0}'")]
    InvalidPermission(char),
    #[error("invalid ACL entry '{0}': expected scheme:id:perm")]
    MissingField(String),
    #[error("invalid numeric permission '{0}'")]
    InvalidNumber(String),
}

/// 5-bit permission mask. Bit values match the server's wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u8);

impl Permissions {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(1 << 1);
    pub const CREATE: Self = Self(1 << 2);
    pub const DELETE: Self = Self(1 << 3);
    pub const ADMIN: Self = Self(1 << 4);
    pub const ALL: Self = Self(31);

    // Letter order is part of the rendered output format.
    const RENDER_ORDER: [(Self, char); 5] = [
        (Self::CREATE, 'c'),
        (Self::DELETE, 'd'),
        (Self::READ, 'r'),
        (Self::WRITE, 'w'),
        (Self::ADMIN, 'a'),
    ];

    /// Build a mask from raw bits, clamping into `[0, 31]`.
    pub fn from_bits(bits: i32) -> Self {
        Self(bits.clamp(0, Self::ALL.0 as i32) as u8)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn from_letter(letter: char) -> Result<Self, AclParseError> {
        match letter {
            'r' => Ok(Self::READ),
            'w' => Ok(Self::WRITE),
            'c' => Ok(Self::CREATE),
            'd' => Ok(Self::DELETE),
            'a' => Ok(Self::ADMIN),
            other => Err(AclParseError::InvalidPermission(other)),
        }
    }

    /// Parse a permission field.
    ///
    /// Any non-negative number is accepted and clamped to 31, fractions
    /// truncating. Everything else must be a run of permission letters; an
    /// empty field yields no permissions.
    pub fn parse(text: &str) -> Result<Self, AclParseError> {
        if let Ok(number) = text.parse::<f64>() {
            if number >= 0.0 {
                return Ok(Self(number.min(Self::ALL.0 as f64) as u8));
            }
        }
        text.chars().try_fold(Self::NONE, |perms, letter| {
            Self::from_letter(letter).map(|perm| perms | perm)
        })
    }

    /// Letters for the set bits, in `c d r w a` order.
    pub fn letters(&self) -> String {
        Self::RENDER_ORDER
            .iter()
            .filter(|(perm, _)| self.contains(*perm))
            .map(|(_, letter)| *letter)
            .collect()
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromStr for Permissions {
    type Err = AclParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

/// A single access rule attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Acl {
    pub scheme: String,
    pub id: String,
    pub perms: Permissions,
}

impl Acl {
    pub fn new(scheme: impl Into<String>, id: impl Into<String>, perms: Permissions) -> Self {
        Self {
            scheme: scheme.into(),
            id: id.into(),
            perms,
        }
    }

    /// Parse one `scheme:id:perm` entry. Extra fields past the
    /// permission field are ignored.
    pub fn parse_entry(entry: &str) -> Result<Self, AclParseError> {
        let fields: Vec<&str> = entry.split(':').collect();
        let (scheme, id, perms) = match fields.as_slice() {
            [DIGEST_SCHEME, user, hash, perms, ..] => {
                (DIGEST_SCHEME, format!("{}:{}", user, hash), *perms)
            }
            [scheme, id, perms, ..] => (*scheme, id.to_string(), *perms),
            _ => return Err(AclParseError::MissingField(entry.to_string())),
        };
        Ok(Self::new(scheme, id, Permissions::parse(perms)?))
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.id, self.perms)
    }
}

/// Decode a comma-separated ACL list, preserving order and duplicates.
///
/// Fails on the first malformed entry; nothing parsed before it is returned.
pub fn decode(text: &str) -> Result<Vec<Acl>, AclParseError> {
    text.split(',').map(Acl::parse_entry).collect()
}

/// Render each entry as `scheme:id:<letters>`.
pub fn encode(acls: &[Acl]) -> Vec<String> {
    acls.iter().map(ToString::to_string).collect()
}

/// `world:anyone` with the given permissions.
pub fn world_acl(perms: Permissions) -> Vec<Acl> {
    vec![Acl::new(WORLD_SCHEME, ANYONE_ID, perms)]
}

/// Identity string the server derives for digest credentials:
/// `user:base64(sha1("user:password"))`.
pub fn digest_identity(user: &str, password: &str) -> String {
    let hash = Sha1::digest(format!("{}:{}", user, password).as_bytes());
    format!(
        "{}:{}",
        user,
        base64::engine::general_purpose::STANDARD.encode(hash)
    )
}

/// One digest entry per comma-separated numeric permission value.
pub fn digest_acls(user: &str, password: &str, perms_csv: &str) -> Result<Vec<Acl>, AclParseError> {
    let id = digest_identity(user, password);
    perms_csv
        .split(',')
        .map(|value| {
            let bits = value
                .trim()
                .parse::<i32>()
                .map_err(|_| AclParseError::InvalidNumber(value.to_string()))?;
            Ok(Acl::new(DIGEST_SCHEME, id.clone(), Permissions::from_bits(bits)))
        })
        .collect()
}

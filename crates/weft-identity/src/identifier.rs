// src/identifier.rs
//
// Identifier: an interned name plus a discriminator that versions its meaning.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::IdentifierError;

/// Versioning token attached to an identifier.
///
/// Two identifiers with the same name but different discriminators were
/// registered with different meanings. Zero means the meaning is not yet known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Discriminator(u16);

impl Discriminator {
    pub const UNRESOLVED: Discriminator = Discriminator(0);

    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self.0 != 0
    }
}

/// An opaque, cheaply clonable name token.
///
/// Equality, hashing and ordering only consider the name. The discriminator
/// travels with the identifier so callers can find out which registered
/// meaning it refers to.
#[derive(Clone)]
pub struct Identifier {
    name: Arc<str>,
    discriminator: Discriminator,
}

impl Identifier {
    /// Create an unresolved identifier, validating the name.
    pub fn new(name: &str) -> Result<Self, IdentifierError> {
        validate_name(name)?;
        Ok(Self {
            name: Arc::from(name),
            discriminator: Discriminator::UNRESOLVED,
        })
    }

    /// Build from an already interned name (registry use only).
    pub(crate) fn from_interned(name: Arc<str>, discriminator: Discriminator) -> Self {
        Self {
            name,
            discriminator,
        }
    }

    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = discriminator;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn discriminator(&self) -> Discriminator {
        self.discriminator
    }

    pub fn set_discriminator(&mut self, discriminator: Discriminator) {
        self.discriminator = discriminator;
    }

    /// True when both the name and the discriminator agree.
    pub fn same_meaning(&self, other: &Identifier) -> bool {
        self.name == other.name && self.discriminator == other.discriminator
    }
}

fn validate_name(name: &str) -> Result<(), IdentifierError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(IdentifierError::Empty);
    };
    if first.is_ascii_digit() {
        return Err(IdentifierError::LeadingDigit {
            name: name.to_string(),
        });
    }
    if let Some(ch) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(IdentifierError::InvalidCharacter {
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.discriminator.is_resolved() {
            write!(f, "{}'{}", self.name, self.discriminator.0)
        } else {
            f.write_str(&self.name)
        }
    }
}

// Keep debug output short: identifiers show up inside every value dump.
impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    /// Parse `name` or `name'N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('\'') {
            Some((name, disc)) => {
                let value: u16 =
                    disc.parse()
                        .map_err(|_| IdentifierError::InvalidDiscriminator {
                            text: disc.to_string(),
                        })?;
                Ok(Identifier::new(name)?.with_discriminator(Discriminator(value)))
            }
            None => Identifier::new(s),
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

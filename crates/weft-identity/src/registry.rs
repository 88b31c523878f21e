// src/registry.rs
//
// IdentifierRegistry: interns identifier names and versions their meanings.

use std::sync::Arc;

use rustc_hash::FxBuildHasher;

use crate::{Discriminator, Identifier, IdentifierError};

#[derive(Debug, Clone)]
struct NameEntry {
    interned: Arc<str>,
    /// Registered meanings. Discriminator `n` refers to `meanings[n - 1]`.
    meanings: Vec<String>,
}

/// Interns identifier names and records what each discriminator means.
///
/// The registry is an ordinary value: whoever builds types or resolves
/// identifiers receives it explicitly.
#[derive(Debug, Clone)]
pub struct IdentifierRegistry {
    names: hashbrown::HashMap<Arc<str>, NameEntry, FxBuildHasher>,
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self {
            names: hashbrown::HashMap::with_hasher(FxBuildHasher),
        }
    }
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name without attaching a meaning.
    pub fn intern(&mut self, name: &str) -> Result<Identifier, IdentifierError> {
        let entry = self.entry(name)?;
        Ok(Identifier::from_interned(
            entry.interned.clone(),
            Discriminator::UNRESOLVED,
        ))
    }

    /// Register `label` as a meaning of `name`, returning an identifier whose
    /// discriminator selects that meaning. Registering the same label twice
    /// returns the same discriminator.
    pub fn add(&mut self, name: &str, label: &str) -> Result<Identifier, IdentifierError> {
        let entry = self.entry(name)?;
        let position = match entry.meanings.iter().position(|m| m == label) {
            Some(position) => position,
            None => {
                if entry.meanings.len() >= usize::from(u16::MAX) {
                    return Err(IdentifierError::TooManyMeanings {
                        name: name.to_string(),
                        limit: usize::from(u16::MAX),
                    });
                }
                entry.meanings.push(label.to_string());
                entry.meanings.len() - 1
            }
        };
        // position < u16::MAX, checked above
        let discriminator = Discriminator::new(position as u16 + 1);
        Ok(Identifier::from_interned(entry.interned.clone(), discriminator))
    }

    /// Look up a previously interned name.
    pub fn get(&self, name: &str) -> Option<Identifier> {
        self.names
            .get(name)
            .map(|e| Identifier::from_interned(e.interned.clone(), Discriminator::UNRESOLVED))
    }

    /// The label registered for the identifier's discriminator, if any.
    pub fn resolve_label(&self, id: &Identifier) -> Option<&str> {
        let disc = id.discriminator();
        if !disc.is_resolved() {
            return None;
        }
        self.names
            .get(id.name())
            .and_then(|e| e.meanings.get(usize::from(disc.get()) - 1))
            .map(String::as_str)
    }

    /// Resolve an unresolved identifier to its meaning when exactly one is
    /// registered. Returns whether the identifier ends up resolved.
    pub fn try_resolve(&self, id: &mut Identifier) -> bool {
        if id.discriminator().is_resolved() {
            return true;
        }
        match self.names.get(id.name()) {
            Some(entry) if entry.meanings.len() == 1 => {
                id.set_discriminator(Discriminator::new(1));
                true
            }
            _ => false,
        }
    }

    pub fn meanings(&self, name: &str) -> &[String] {
        self.names
            .get(name)
            .map(|e| e.meanings.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn entry(&mut self, name: &str) -> Result<&mut NameEntry, IdentifierError> {
        let interned: Arc<str> = match self.names.get_key_value(name) {
            Some((key, _)) => key.clone(),
            None => Arc::from(Identifier::new(name)?.name()),
        };
        Ok(self
            .names
            .entry(interned.clone())
            .or_insert_with(|| NameEntry {
                interned,
                meanings: Vec::new(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_shares_storage() {
        let mut reg = IdentifierRegistry::new();
        let a = reg.intern("speed").unwrap();
        let b = reg.intern("speed").unwrap();
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn meanings_get_distinct_discriminators() {
        let mut reg = IdentifierRegistry::new();
        let a = reg.add("mode", "Playback mode").unwrap();
        let b = reg.add("mode", "Blend mode").unwrap();
        let a2 = reg.add("mode", "Playback mode").unwrap();
        assert_eq!(a.discriminator(), Discriminator::new(1));
        assert_eq!(b.discriminator(), Discriminator::new(2));
        assert!(a.same_meaning(&a2));
        assert_eq!(reg.resolve_label(&b), Some("Blend mode"));
    }

    #[test]
    fn try_resolve_unique_meaning() {
        let mut reg = IdentifierRegistry::new();
        reg.add("gain", "Gain").unwrap();
        let mut id = Identifier::new("gain").unwrap();
        assert!(reg.try_resolve(&mut id));
        assert_eq!(reg.resolve_label(&id), Some("Gain"));

        reg.add("gain", "Other gain").unwrap();
        let mut ambiguous = Identifier::new("gain").unwrap();
        assert!(!reg.try_resolve(&mut ambiguous));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut reg = IdentifierRegistry::new();
        assert!(reg.intern("not valid").is_err());
        assert!(reg.is_empty());
    }
}

//! # Character Property Lookup
//!
//! `\P{name=value}`, `\P{value}` and `\N{name}` are resolved through a
//! [`PropertyLookup`]. The compiler itself carries no Unicode database;
//! callers plug in a table ([`PropertyTable`]) or, with the `unicode`
//! feature, [`IdentProperties`] for the identifier properties.

use crate::error::PropertyError;
use crate::set::NumberSet;
use compact_str::CompactString;
use hashbrown::HashMap;

/// Resolves character properties to code sets
pub trait PropertyLookup {
    /// The set of codes having property `name`, or `name == value` when a
    /// value is given.
    ///
    /// # Errors
    ///
    /// Unknown properties and values.
    fn lookup(&self, name: &str, value: Option<&str>) -> Result<NumberSet, PropertyError>;
}

/// Knows no properties at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;

impl PropertyLookup for NoProperties {
    fn lookup(&self, name: &str, value: Option<&str>) -> Result<NumberSet, PropertyError> {
        Err(PropertyError::new(name, value, "no property database configured"))
    }
}

/// Properties from an explicit table.
///
/// Entries are keyed by `(name, value)`; binary properties and bare values
/// (`\P{Greek}`) use `None` as value.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    entries: HashMap<(CompactString, Option<CompactString>), NumberSet, ahash::RandomState>,
}

impl PropertyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an entry.
    #[must_use]
    pub fn with(mut self, name: &str, value: Option<&str>, set: NumberSet) -> Self {
        self.insert(name, value, set);
        self
    }

    pub fn insert(&mut self, name: &str, value: Option<&str>, set: NumberSet) {
        self.entries
            .insert((CompactString::new(name), value.map(CompactString::new)), set);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyLookup for PropertyTable {
    fn lookup(&self, name: &str, value: Option<&str>) -> Result<NumberSet, PropertyError> {
        let key = (CompactString::new(name), value.map(CompactString::new));
        self.entries.get(&key).cloned().ok_or_else(|| {
            let reason = if value.is_some() && self.entries.keys().any(|(n, _)| n == name) {
                "unknown property value"
            } else {
                "unknown property"
            };
            PropertyError::new(name, value, reason)
        })
    }
}

/// `XID_Start` and `XID_Continue` from the `unicode-ident` tables.
///
/// The sets are computed once per process by scanning all code points.
#[cfg(feature = "unicode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentProperties;

#[cfg(feature = "unicode")]
impl IdentProperties {
    fn scan(pred: fn(char) -> bool) -> NumberSet {
        let mut set = NumberSet::new();
        let mut run: Option<(i64, i64)> = None;
        for c in (0..=0x10_FFFF_u32).filter_map(char::from_u32) {
            if !pred(c) {
                continue;
            }
            let code = i64::from(u32::from(c));
            run = match run {
                Some((first, last)) if last + 1 == code => Some((first, code)),
                Some((first, last)) => {
                    set.add_interval(crate::set::Interval::inclusive(first, last));
                    Some((code, code))
                }
                None => Some((code, code)),
            };
        }
        if let Some((first, last)) = run {
            set.add_interval(crate::set::Interval::inclusive(first, last));
        }
        set
    }
}

#[cfg(feature = "unicode")]
impl PropertyLookup for IdentProperties {
    fn lookup(&self, name: &str, value: Option<&str>) -> Result<NumberSet, PropertyError> {
        use std::sync::OnceLock;
        static XID_START: OnceLock<NumberSet> = OnceLock::new();
        static XID_CONTINUE: OnceLock<NumberSet> = OnceLock::new();

        if value.is_some() {
            return Err(PropertyError::new(name, value, "only binary properties are supported"));
        }
        match name {
            "XID_Start" | "XIDS" => Ok(XID_START.get_or_init(|| Self::scan(unicode_ident::is_xid_start)).clone()),
            "XID_Continue" | "XIDC" => {
                Ok(XID_CONTINUE.get_or_init(|| Self::scan(unicode_ident::is_xid_continue)).clone())
            }
            _ => Err(PropertyError::new(name, value, "unknown property")),
        }
    }
}

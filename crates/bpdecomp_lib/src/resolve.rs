use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maps raw references found in a script to display names.
///
/// Implementors only answer [`lookup`](NameResolver::lookup); the provided
/// [`resolve`](NameResolver::resolve) turns a miss into the hex fallback so
/// the decompiler always has something to print.
pub trait NameResolver {
    fn lookup(&self, reference: u64) -> Option<String>;

    fn resolve(&self, reference: u64) -> String {
        if reference == 0 {
            return "None".into();
        }
        match self.lookup(reference) {
            Some(name) if !name.is_empty() => name,
            _ => format!("0x{reference:X}"),
        }
    }
}

impl<F> NameResolver for F
where
    F: Fn(u64) -> Option<String>,
{
    fn lookup(&self, reference: u64) -> Option<String> {
        self(reference)
    }
}

/// Knows no names; every non-null reference prints as hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexResolver;

impl NameResolver for HexResolver {
    fn lookup(&self, _reference: u64) -> Option<String> {
        None
    }
}

/// A fixed reference -> name table, typically captured next to the script
/// bytes by whatever produced the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMap {
    names: HashMap<u64, String>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: u64, name: impl Into<String>) -> Option<String> {
        self.names.insert(reference, name.into())
    }

    pub fn get(&self, reference: u64) -> Option<&str> {
        self.names.get(&reference).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parses a JSON object of `{"<reference>": "<name>"}`. Keys are hex with a
    /// `0x` prefix or plain decimal.
    pub fn from_json(src: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(src)?;
        let mut map = SymbolMap::new();
        for (key, name) in raw {
            let reference = parse_reference(&key).ok_or(Error::InvalidReference(key))?;
            map.insert(reference, name);
        }
        Ok(map)
    }
}

impl FromIterator<(u64, String)> for SymbolMap {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

impl NameResolver for SymbolMap {
    fn lookup(&self, reference: u64) -> Option<String> {
        self.get(reference).map(str::to_owned)
    }
}

fn parse_reference(key: &str) -> Option<u64> {
    let key = key.trim();
    match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => key.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn null_reference_is_none() {
        assert_eq!(HexResolver.resolve(0), "None");
        let map: SymbolMap = [(0, "Zero".to_string())].into_iter().collect();
        assert_eq!(map.resolve(0), "None");
    }

    #[test]
    fn misses_fall_back_to_uppercase_hex() {
        assert_eq!(HexResolver.resolve(0x7ff6_abcd_0010), "0x7FF6ABCD0010");
    }

    #[test]
    fn empty_names_fall_back_to_hex() {
        let mut map = SymbolMap::new();
        map.insert(0x10, "");
        assert_eq!(map.resolve(0x10), "0x10");
    }

    #[test]
    fn closures_resolve() {
        let r = |reference: u64| (reference == 42).then(|| "Answer".to_string());
        assert_eq!(r.resolve(42), "Answer");
        assert_eq!(r.resolve(43), "0x2B");
    }

    #[test]
    fn symbol_map_from_json() {
        let map = SymbolMap::from_json(r#"{"0x1000": "Foo", "4097": "Bar", "0XFF": "Baz"}"#)
            .expect("valid map");
        assert_eq!(map.len(), 3);
        assert_eq!(map.resolve(0x1000), "Foo");
        assert_eq!(map.resolve(0x1001), "Bar");
        assert_eq!(map.resolve(0xff), "Baz");
    }

    #[test_case(r#"{"zzz": "Foo"}"#; "bad key")]
    #[test_case(r#"{"0x10": 5}"#; "non string name")]
    #[test_case("[1, 2]"; "not an object")]
    fn symbol_map_rejects(src: &str) {
        assert!(SymbolMap::from_json(src).is_err());
    }
}

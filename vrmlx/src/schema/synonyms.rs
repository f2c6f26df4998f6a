//! Alternate header spellings
use super::catalog::NODE_NAMES;
use crate::Error;
use std::collections::HashMap;
use std::path::Path;

/// Map from header spellings to canonical node names
///
/// A fresh table maps every canonical name to itself; further spellings are
/// added with [`insert`](Self::insert) or loaded from a JSON object of the
/// form `{ "synonym": "Canonical" }`.
#[derive(Clone, Debug)]
pub struct Synonyms {
    map: HashMap<String, String>,
}

impl Default for Synonyms {
    fn default() -> Self {
        let map = NODE_NAMES
            .iter()
            .map(|n| (n.to_string(), n.to_string()))
            .collect();
        Self { map }
    }
}

impl Synonyms {
    /// Builds the identity table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the `VRML`-prefixed spelling of every canonical name
    ///
    /// For example, `VRMLGroup` becomes a synonym of `Group`.
    pub fn with_vrml_prefix(mut self) -> Self {
        for n in NODE_NAMES {
            self.insert(&format!("VRML{n}"), n);
        }
        self
    }

    /// Records `synonym` as another spelling of `canonical`
    pub fn insert(&mut self, synonym: &str, canonical: &str) {
        self.map.insert(synonym.to_owned(), canonical.to_owned());
    }

    /// Extends the identity table with a JSON object
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let extra: HashMap<String, String> = serde_json::from_str(text)?;
        let mut out = Self::new();
        for (k, v) in &extra {
            out.insert(k, v);
        }
        Ok(out)
    }

    /// Loads a JSON synonym table from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Returns the canonical name of a header
    ///
    /// Headers without an entry are returned unchanged.
    pub fn canonical<'a>(&'a self, header: &'a str) -> &'a str {
        self.map.get(header).map(String::as_str).unwrap_or(header)
    }

    /// Iterates over every spelling of `canonical` other than itself
    pub fn synonyms_of<'a>(
        &'a self,
        canonical: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.map
            .iter()
            .filter(move |(k, v)| *v == canonical && *k != canonical)
            .map(|(k, _)| k.as_str())
    }
}

//! Fixed display-name ↔ ticker-symbol mapping.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{CatalogError, Symbol};

/// One catalog row as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub symbol: Symbol,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            name: name.into(),
            symbol,
        }
    }
}

/// Order-preserving ticker catalog with unique names and symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_symbol: HashMap<Symbol, usize>,
}

const COMMODITIES: [(&str, &str); 15] = [
    ("Natural Gas", "NG=F"),
    ("Brent Oil", "BZ=F"),
    ("Crude Oil", "CL=F"),
    ("Gold", "GC=F"),
    ("Silver", "SI=F"),
    ("Copper", "HG=F"),
    ("Palladium", "PA=F"),
    ("Platinum", "PL=F"),
    ("Corn", "ZC=F"),
    ("Soybeans", "ZS=F"),
    ("Wheat", "ZW=F"),
    ("Cotton", "CT=F"),
    ("Sugar", "SB=F"),
    ("Coffee", "KC=F"),
    ("Cocoa", "CC=F"),
];

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_symbol = HashMap::with_capacity(entries.len());
        let mut names = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if by_symbol.insert(entry.symbol.clone(), index).is_some() {
                return Err(CatalogError::DuplicateSymbol {
                    symbol: entry.symbol.to_string(),
                });
            }
            if !names.insert(entry.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: entry.name.clone(),
                });
            }
        }

        Ok(Self {
            entries,
            by_symbol,
        })
    }

    /// Default commodity futures catalog.
    pub fn commodities() -> Self {
        Self::new(default_entries()).expect("built-in commodity catalog is valid")
    }

    pub fn name_for(&self, symbol: &Symbol) -> Option<&str> {
        self.by_symbol
            .get(symbol)
            .map(|&index| self.entries[index].name.as_str())
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|entry| &entry.symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries backing [`Catalog::commodities`].
pub fn default_entries() -> Vec<CatalogEntry> {
    COMMODITIES
        .iter()
        .map(|(name, symbol)| {
            CatalogEntry::new(
                *name,
                Symbol::parse(symbol).expect("built-in commodity symbols are valid"),
            )
        })
        .collect()
}

use crate::dependency::CatalogName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical constraint for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub constraint: String,
}

/// One catalog: dependency name -> entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry. A later insert for the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, constraint: impl Into<String>) {
        let name = name.into();
        self.entries.insert(
            name.clone(),
            CatalogEntry {
                name,
                constraint: constraint.into(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for CatalogTable {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut table = CatalogTable::new();
        for (name, constraint) in iter {
            table.insert(name, constraint);
        }
        table
    }
}

/// Why a catalog lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLookupMiss {
    CatalogMissing,
    EntryMissing,
}

/// The default catalog plus any named catalogs. Read-only once resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub default: CatalogTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, CatalogTable>,
}

impl Catalog {
    pub fn new(default: CatalogTable) -> Self {
        Self {
            default,
            named: BTreeMap::new(),
        }
    }

    pub fn with_named(mut self, name: impl Into<String>, table: CatalogTable) -> Self {
        self.named.insert(name.into(), table);
        self
    }

    /// True when no table holds any entry.
    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.named.values().all(CatalogTable::is_empty)
    }

    /// Total number of entries across all tables.
    pub fn entry_count(&self) -> usize {
        self.default.len() + self.named.values().map(CatalogTable::len).sum::<usize>()
    }

    pub fn table(&self, name: &CatalogName) -> Option<&CatalogTable> {
        match name {
            CatalogName::Default => Some(&self.default),
            CatalogName::Named(n) => self.named.get(n),
        }
    }

    pub fn lookup(&self, catalog: &CatalogName, dep: &str) -> Result<&CatalogEntry, CatalogLookupMiss> {
        let table = self.table(catalog).ok_or(CatalogLookupMiss::CatalogMissing)?;
        table.get(dep).ok_or(CatalogLookupMiss::EntryMissing)
    }
}

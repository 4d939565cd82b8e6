use crate::scanner::Workspace;
use camino::Utf8Path;
use std::collections::BTreeMap;
use tame_manifest::{Node, ScalarKind};
use tame_types::{Catalog, CatalogTable, WorkspaceError, WorkspaceFlavor, DEFAULT_CATALOG};
use tracing::info;

/// Extracts the canonical catalog tables from the root manifest.
///
/// Absent sections yield an empty [`Catalog`]; only malformed ones fail.
pub fn resolve_catalog(workspace: &Workspace) -> Result<Catalog, WorkspaceError> {
    let manifest = workspace.root.join(&workspace.root_manifest_path);
    let doc = &workspace.root_manifest;

    // Later sources override earlier ones entry by entry.
    let sources: Vec<(&str, Option<&Node>, Option<&Node>)> = match workspace.flavor {
        WorkspaceFlavor::Pnpm => vec![("", doc.get(&["catalog"]), doc.get(&["catalogs"]))],
        WorkspaceFlavor::PackageJson => vec![
            ("", doc.get(&["catalog"]), doc.get(&["catalogs"])),
            (
                "workspaces.",
                doc.get(&["workspaces", "catalog"]),
                doc.get(&["workspaces", "catalogs"]),
            ),
        ],
    };

    let mut default = CatalogTable::new();
    let mut named: BTreeMap<String, CatalogTable> = BTreeMap::new();

    for (prefix, catalog_node, catalogs_node) in sources {
        let from_catalog = read_table(catalog_node, &format!("{prefix}catalog"), &manifest)?;

        let mut from_catalogs_default = CatalogTable::new();
        for (name, node) in catalog_map(catalogs_node, &format!("{prefix}catalogs"), &manifest)? {
            let table = read_table(Some(node), &format!("{prefix}catalogs.{name}"), &manifest)?;
            if name == DEFAULT_CATALOG {
                from_catalogs_default = table;
            } else {
                let slot = named.entry(name.to_string()).or_default();
                for entry in table.iter() {
                    slot.insert(entry.name.as_str(), entry.constraint.as_str());
                }
            }
        }

        if !from_catalog.is_empty() && !from_catalogs_default.is_empty() {
            return Err(WorkspaceError::ConflictingDefaultCatalog { manifest });
        }
        for entry in from_catalog.iter().chain(from_catalogs_default.iter()) {
            default.insert(entry.name.as_str(), entry.constraint.as_str());
        }
    }

    let catalog = Catalog { default, named };
    info!(
        entries = catalog.entry_count(),
        named = catalog.named.len(),
        "resolved catalog"
    );
    Ok(catalog)
}

fn catalog_map<'a>(
    node: Option<&'a Node>,
    field: &str,
    manifest: &Utf8Path,
) -> Result<Vec<(&'a str, &'a Node)>, WorkspaceError> {
    match node {
        None => Ok(Vec::new()),
        Some(n) if n.is_null() => Ok(Vec::new()),
        Some(Node::Map(map)) => Ok(map
            .entries
            .iter()
            .map(|e| (e.key.as_str(), &e.value))
            .collect()),
        Some(_) => Err(WorkspaceError::InvalidField {
            manifest: manifest.to_path_buf(),
            field: field.to_string(),
            expected: "a mapping of catalog names to catalogs",
        }),
    }
}

fn read_table(node: Option<&Node>, field: &str, manifest: &Utf8Path) -> Result<CatalogTable, WorkspaceError> {
    let mut table = CatalogTable::new();
    let entries = match node {
        None => return Ok(table),
        Some(n) if n.is_null() => return Ok(table),
        Some(Node::Map(map)) => &map.entries,
        Some(_) => {
            return Err(WorkspaceError::InvalidField {
                manifest: manifest.to_path_buf(),
                field: field.to_string(),
                expected: "a mapping of dependency names to versions",
            });
        }
    };

    for entry in entries {
        match entry.value.as_scalar() {
            Some(scalar) if scalar.kind != ScalarKind::Null => {
                table.insert(entry.key.as_str(), scalar.text.as_str());
            }
            _ => {
                return Err(WorkspaceError::InvalidField {
                    manifest: manifest.to_path_buf(),
                    field: format!("{field}.{}", entry.key),
                    expected: "a version string",
                });
            }
        }
    }
    Ok(table)
}

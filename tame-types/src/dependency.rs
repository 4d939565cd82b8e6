use crate::{CATALOG_PROTOCOL, DEFAULT_CATALOG};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency table inside `package.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DependencySection {
    #[serde(rename = "dependencies")]
    Dependencies,
    #[serde(rename = "devDependencies")]
    DevDependencies,
    #[serde(rename = "peerDependencies")]
    PeerDependencies,
    #[serde(rename = "optionalDependencies")]
    OptionalDependencies,
}

impl DependencySection {
    /// Every section, in scan order.
    pub const ALL: [DependencySection; 4] = [
        DependencySection::Dependencies,
        DependencySection::DevDependencies,
        DependencySection::PeerDependencies,
        DependencySection::OptionalDependencies,
    ];

    /// The key used in `package.json`.
    pub fn key(self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::DevDependencies => "devDependencies",
            DependencySection::PeerDependencies => "peerDependencies",
            DependencySection::OptionalDependencies => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which catalog a `catalog:` marker points at.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogName {
    Default,
    Named(String),
}

impl CatalogName {
    /// Normalizes `default` to [`CatalogName::Default`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name == DEFAULT_CATALOG {
            CatalogName::Default
        } else {
            CatalogName::Named(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CatalogName::Default => DEFAULT_CATALOG,
            CatalogName::Named(n) => n,
        }
    }
}

impl fmt::Display for CatalogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a dependency's version is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DeclaredForm {
    /// An explicit version constraint such as `^1.2.0`.
    Explicit(String),
    /// The catalog-reference marker. Carries no version of its own.
    CatalogRef(CatalogName),
    /// A non-registry specifier (`workspace:`, `link:`, git, URLs, ...).
    Protocol(String),
}

const PROTOCOL_PREFIXES: &[&str] = &[
    "workspace:",
    "link:",
    "file:",
    "portal:",
    "patch:",
    "npm:",
    "jsr:",
    "git:",
    "git+",
    "github:",
    "gitlab:",
    "bitbucket:",
    "http:",
    "https:",
];

impl DeclaredForm {
    /// Classifies the raw string found in a dependency table.
    pub fn classify(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(CATALOG_PROTOCOL) {
            return DeclaredForm::CatalogRef(CatalogName::from_name(rest));
        }
        let lowered = raw.trim_start().to_ascii_lowercase();
        if PROTOCOL_PREFIXES.iter().any(|p| lowered.starts_with(p)) || is_repo_shorthand(raw) {
            return DeclaredForm::Protocol(raw.to_string());
        }
        DeclaredForm::Explicit(raw.to_string())
    }
}

// `user/repo` and `user/repo#ref` resolve against GitHub.
fn is_repo_shorthand(raw: &str) -> bool {
    let head = raw.split('#').next().unwrap_or(raw);
    let mut parts = head.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) => {
            !owner.is_empty()
                && !repo.is_empty()
                && !owner.starts_with('@')
                && owner
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        }
        _ => false,
    }
}

/// One entry of a dependency table in a member manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub section: DependencySection,
    /// `[section, name]` inside the manifest.
    pub key_path: Vec<String>,
    pub declared: DeclaredForm,
}

impl DependencySpec {
    pub fn new(section: DependencySection, name: impl Into<String>, raw: &str) -> Self {
        let name = name.into();
        Self {
            key_path: vec![section.key().to_string(), name.clone()],
            name,
            section,
            declared: DeclaredForm::classify(raw),
        }
    }
}

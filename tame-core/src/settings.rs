//! Clap-free settings for the check and fix pipelines.

use tame_domain::ScanOptions;
use tame_types::{DependencySection, ReconcileMode};

/// Settings for the check pipeline.
///
/// The workspace root is not part of the settings; it comes from the
/// [`RepoView`](tame_domain::RepoView) handed to the pipeline.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub mode: ReconcileMode,

    // Scan
    pub sections: Vec<DependencySection>,
    pub jobs: Option<usize>,
    pub exclude: Vec<String>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::default(),
            sections: DependencySection::ALL.to_vec(),
            jobs: None,
            exclude: Vec::new(),
        }
    }
}

impl CheckSettings {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            sections: self.sections.clone(),
            jobs: self.jobs,
            exclude: self.exclude.clone(),
        }
    }
}

/// Settings for the fix pipeline.
#[derive(Debug, Clone, Default)]
pub struct FixSettings {
    pub check: CheckSettings,
    pub dry_run: bool,
}

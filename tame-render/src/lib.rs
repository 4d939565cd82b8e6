//! Rendering helpers (plain text and JSON) for check and fix reports.

use anyhow::Context;
use serde::Serialize;
use tame_types::{CheckReport, FixReport, Violation, ViolationKind};

pub fn render_check_text(report: &CheckReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Checked {} package{} against {} catalog entr{} (mode: {})\n",
        report.packages,
        plural(report.packages, "", "s"),
        report.catalog_entries,
        plural(report.catalog_entries, "y", "ies"),
        report.mode
    ));

    if report.is_clean() {
        out.push_str("All packages conform to the catalog.\n");
        return out;
    }

    if !report.violations.is_empty() {
        out.push_str(&format!("\nViolations ({}):\n", report.violations.len()));
        for v in &report.violations {
            out.push_str(&format!("  {}\n", violation_line(v)));
        }
    }

    if !report.errors.is_empty() {
        out.push_str(&format!(
            "\nUnresolved catalog references ({}):\n",
            report.errors.len()
        ));
        for e in &report.errors {
            out.push_str(&format!("  {e}\n"));
        }
    }

    if !report.violations.is_empty() {
        out.push_str("\nRun `tame fix` to rewrite the offending fields.\n");
    }
    out
}

pub fn render_fix_text(report: &FixReport) -> String {
    let mut out = String::new();

    if report.files.is_empty() {
        out.push_str("Nothing to fix.\n");
        return out;
    }

    let verb = if report.dry_run { "Would update" } else { "Updated" };
    for fc in &report.files {
        out.push_str(&format!(
            "{} {} ({} edit{})\n",
            verb,
            fc.path,
            fc.edits,
            plural(fc.edits, "", "s")
        ));
    }
    out.push_str(&format!(
        "{} field{} in {} file{}{}\n",
        report.edits_total(),
        plural(report.edits_total(), "", "s"),
        report.files.len(),
        plural(report.files.len() as u64, "", "s"),
        if report.dry_run { " (dry run, nothing written)" } else { "" }
    ));

    if report.dry_run && !report.patch.is_empty() {
        out.push('\n');
        out.push_str(&report.patch);
    }
    out
}

/// Pretty JSON with a trailing newline.
pub fn render_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("serialize report")?;
    json.push('\n');
    Ok(json)
}

fn violation_line(v: &Violation) -> String {
    match v.kind {
        ViolationKind::Mismatch => format!(
            "{}: {}.{} is \"{}\", catalog has \"{}\"",
            v.manifest, v.section, v.dependency, v.current, v.canonical
        ),
        ViolationKind::NotReferenced => format!(
            "{}: {}.{} is \"{}\", expected \"{}\" (catalog has \"{}\")",
            v.manifest, v.section, v.dependency, v.current, v.expected, v.canonical
        ),
    }
}

fn plural(n: u64, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

use camino::{Utf8Path, Utf8PathBuf};
use cucumber::{given, then, when, World};
use fs_err as fs;
use std::collections::BTreeMap;
use tame_core::{
    run_check, run_fix, AtomicFsWriter, CheckOutcome, CheckSettings, FixSettings, FsRepoView,
};
use tame_render::render_check_text;
use tame_types::{FixReport, ReconcileMode, TameError};
use tempfile::TempDir;

#[derive(Debug, Default, World)]
pub struct TameWorld {
    temp: Option<TempDir>,
    repo_root: Option<Utf8PathBuf>,
    mode: ReconcileMode,
    packages: BTreeMap<String, Vec<(String, String)>>,
    before: BTreeMap<Utf8PathBuf, String>,
    check: Option<CheckOutcome>,
    fix: Option<Result<FixReport, TameError>>,
}

fn repo_root(world: &TameWorld) -> &Utf8PathBuf {
    world.repo_root.as_ref().expect("repo_root set")
}

fn manifest_path(root: &Utf8Path, package: &str) -> Utf8PathBuf {
    root.join("packages").join(package).join("package.json")
}

fn snapshot(root: &Utf8Path) -> BTreeMap<Utf8PathBuf, String> {
    fn walk(dir: &Utf8Path, out: &mut BTreeMap<Utf8PathBuf, String>) {
        for entry in dir.read_dir_utf8().expect("read dir") {
            let entry = entry.expect("dir entry");
            if entry.file_type().expect("file type").is_dir() {
                walk(entry.path(), out);
            } else {
                let contents = fs::read_to_string(entry.path()).expect("read file");
                out.insert(entry.path().to_path_buf(), contents);
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, &mut out);
    out
}

fn settings(world: &TameWorld) -> CheckSettings {
    CheckSettings {
        mode: world.mode,
        ..CheckSettings::default()
    }
}

fn new_workspace(world: &mut TameWorld, pnpm_workspace: &str) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    fs::write(root.join("pnpm-workspace.yaml"), pnpm_workspace).unwrap();
    world.temp = Some(td);
    world.repo_root = Some(root);
}

// ============================================================================
// Given
// ============================================================================

#[given(expr = "a pnpm workspace with catalog entry {string} at {string}")]
async fn workspace_with_catalog(world: &mut TameWorld, name: String, version: String) {
    new_workspace(
        world,
        &format!("packages:\n  - packages/*\ncatalog:\n  {name}: '{version}'\n"),
    );
}

#[given("a pnpm workspace without a catalog")]
async fn workspace_without_catalog(world: &mut TameWorld) {
    new_workspace(world, "packages:\n  - packages/*\n");
}

#[given(expr = "reconcile mode {string}")]
async fn reconcile_mode(world: &mut TameWorld, mode: String) {
    world.mode = match mode.as_str() {
        "pin" => ReconcileMode::Pin,
        "reference" => ReconcileMode::Reference,
        other => panic!("unknown mode {other}"),
    };
}

#[given(expr = "a package {string} depending on {string} at {string}")]
async fn package_depending_on(world: &mut TameWorld, package: String, dep: String, version: String) {
    let deps = world.packages.entry(package.clone()).or_default();
    deps.push((dep, version));

    let dependencies: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    let manifest = serde_json::json!({ "name": package, "dependencies": dependencies });

    let path = manifest_path(repo_root(world), &package);
    fs::create_dir_all(path.parent().expect("package dir")).unwrap();
    fs::write(&path, format!("{}\n", serde_json::to_string_pretty(&manifest).unwrap())).unwrap();
}

// ============================================================================
// When
// ============================================================================

#[when("I run check")]
async fn run_check_step(world: &mut TameWorld) {
    world.before = snapshot(repo_root(world));
    let repo = FsRepoView::new(repo_root(world).clone());
    let outcome = run_check(&settings(world), &repo).expect("check succeeds");
    world.check = Some(outcome);
}

async fn fix(world: &mut TameWorld, dry_run: bool) {
    world.before = snapshot(repo_root(world));
    let repo = FsRepoView::new(repo_root(world).clone());
    let fix_settings = FixSettings {
        check: settings(world),
        dry_run,
    };
    world.fix = Some(run_fix(&fix_settings, &repo, &AtomicFsWriter));
}

#[when("I run fix")]
async fn run_fix_step(world: &mut TameWorld) {
    fix(world, false).await;
}

#[when("I run fix with --dry-run")]
async fn run_fix_dry_run(world: &mut TameWorld) {
    fix(world, true).await;
}

// ============================================================================
// Then
// ============================================================================

fn check_outcome(world: &TameWorld) -> &CheckOutcome {
    world.check.as_ref().expect("check ran")
}

fn fix_report(world: &TameWorld) -> &FixReport {
    match world.fix.as_ref().expect("fix ran") {
        Ok(report) => report,
        Err(e) => panic!("fix failed: {e}"),
    }
}

#[then("check finds a catalog")]
async fn check_finds_catalog(world: &mut TameWorld) {
    assert!(check_outcome(world).has_catalog);
}

#[then("check finds no catalog")]
async fn check_finds_no_catalog(world: &mut TameWorld) {
    assert!(!check_outcome(world).has_catalog);
}

#[then(expr = "check reports {int} violation(s)")]
async fn check_violations(world: &mut TameWorld, count: usize) {
    let report = &check_outcome(world).report;
    assert_eq!(report.violations.len(), count, "{:?}", report.violations);
}

#[then(expr = "check reports {int} unresolved reference(s)")]
async fn check_unresolved(world: &mut TameWorld, count: usize) {
    let report = &check_outcome(world).report;
    assert_eq!(report.errors.len(), count, "{:?}", report.errors);
}

#[then(expr = "the check text mentions {string}")]
async fn check_text_mentions(world: &mut TameWorld, needle: String) {
    let text = render_check_text(&check_outcome(world).report);
    assert!(text.contains(&needle), "{text}");
}

#[then("no file was modified")]
async fn no_file_modified(world: &mut TameWorld) {
    assert_eq!(snapshot(repo_root(world)), world.before);
}

#[then(expr = "fix rewrote {int} file(s)")]
async fn fix_rewrote(world: &mut TameWorld, count: usize) {
    assert_eq!(fix_report(world).files.len(), count);
}

#[then(expr = "package {string} depends on {string} at {string}")]
async fn package_depends_on(world: &mut TameWorld, package: String, dep: String, version: String) {
    let text = fs::read_to_string(manifest_path(repo_root(world), &package)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["dependencies"][&dep], serde_json::Value::String(version));
}

#[then(expr = "package {string} was not modified")]
async fn package_not_modified(world: &mut TameWorld, package: String) {
    let path = manifest_path(repo_root(world), &package);
    let now = fs::read_to_string(&path).unwrap();
    assert_eq!(Some(&now), world.before.get(&path));
}

#[then(expr = "the patch sets {string} to {string}")]
async fn patch_sets(world: &mut TameWorld, dep: String, version: String) {
    let patch = &fix_report(world).patch;
    let line = format!("+    \"{dep}\": \"{version}\"");
    assert!(patch.contains(&line), "{patch}");
}

#[then("fix fails with a resolution error")]
async fn fix_fails_with_resolution(world: &mut TameWorld) {
    match world.fix.as_ref().expect("fix ran") {
        Ok(report) => panic!("fix unexpectedly succeeded: {report:?}"),
        Err(e) => assert_eq!(e.kind(), "resolution", "{e}"),
    }
}

#[tokio::main]
async fn main() {
    let features_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    TameWorld::cucumber().run(features_path).await;
}

use std::fs;
use std::path::{Path, PathBuf};

fn rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn rel(path: &Path) -> String {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();
    rel.replace('\\', "/")
}

fn find_violations(root: &Path, forbidden: &[&str], allowed: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in rs_files(root) {
        let rel_path = rel(&file);
        if allowed.contains(&rel_path.as_str()) {
            continue;
        }
        let content = fs::read_to_string(&file).unwrap_or_default();
        for needle in forbidden {
            if content.contains(needle) {
                violations.push(format!("{rel_path} uses `{needle}`"));
            }
        }
    }
    violations
}

fn src() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

#[test]
fn diff_module_is_pure() {
    let violations = find_violations(
        &src(),
        &[
            "crate::ui",
            "crate::render",
            "crate::system::collector",
            "crate::system::gpu",
            "ratatui",
            "crossterm",
            "sysinfo",
        ],
        &[],
    )
    .into_iter()
    .filter(|v| v.starts_with("src/diff.rs"))
    .collect::<Vec<_>>();

    assert!(
        violations.is_empty(),
        "Differ layering violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn ui_module_does_not_reach_into_samplers() {
    let violations = find_violations(
        &src().join("ui"),
        &["crate::system::gpu", "crate::system::collector", "sysinfo"],
        &[],
    );

    assert!(
        violations.is_empty(),
        "UI/system boundary violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn nvml_is_scoped_to_its_backend() {
    let violations = find_violations(
        &src(),
        &["nvml_wrapper"],
        &["src/system/gpu/nvml.rs", "src/error.rs"],
    );

    assert!(
        violations.is_empty(),
        "NVML used outside its backend:\n{}",
        violations.join("\n")
    );
}

#[test]
fn sysinfo_is_scoped_to_the_collector() {
    let violations = find_violations(&src(), &["sysinfo"], &["src/system/collector.rs"]);

    assert!(
        violations.is_empty(),
        "sysinfo used outside the collector:\n{}",
        violations.join("\n")
    );
}

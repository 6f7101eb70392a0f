//! Hygiene: source-level rules for the canvas crate, checked at test time.
//!
//! Each rule scans the production sources under `src/` (test files excluded)
//! for a pattern and compares the hit count against a budget. Budgets only
//! ever go down.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// A forbidden pattern and how many occurrences are tolerated.
struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, why: "propagate or handle the error" },
    Budget { pattern: ".expect(", max: 0, why: "propagate or handle the error" },
    Budget { pattern: "panic!(", max: 0, why: "a panic aborts the wasm instance" },
    Budget { pattern: "unreachable!(", max: 0, why: "a panic aborts the wasm instance" },
    Budget { pattern: "todo!(", max: 0, why: "unfinished code" },
    Budget { pattern: "unimplemented!(", max: 0, why: "unfinished code" },
    Budget { pattern: "let _ =", max: 0, why: "errors must be inspected or logged" },
    Budget { pattern: ".ok()", max: 0, why: "errors must be inspected or logged" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete unused code instead" },
    Budget { pattern: "println!(", max: 0, why: "use the log facade" },
    Budget { pattern: "eprintln!(", max: 0, why: "use the log facade" },
];

/// Modules allowed to touch browser APIs directly.
const DOM_MODULES: &[&str] = &["browser.rs", "dom.rs", "render.rs"];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn report(found: &[(String, usize)]) -> String {
    found
        .iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "run from the canvas crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for budget in BUDGETS {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            failures.push(format!(
                "`{}` budget exceeded: found {count}, max {} ({}).\n{}",
                budget.pattern,
                budget.max,
                budget.why,
                report(&found)
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn browser_apis_stay_in_dom_modules() {
    let files: Vec<SourceFile> = source_files()
        .into_iter()
        .filter(|f| !DOM_MODULES.iter().any(|m| f.path.ends_with(m)))
        .collect();
    let found = hits(&files, "web_sys::");
    assert!(found.is_empty(), "web_sys used outside {DOM_MODULES:?}:\n{}", report(&found));
}

#[test]
fn dom_modules_are_behind_browser_feature() {
    let lib = fs::read_to_string("src/lib.rs").unwrap_or_default();
    let lines: Vec<&str> = lib.lines().map(str::trim).collect();
    let mut ungated = Vec::new();
    for module in DOM_MODULES {
        let name = module.trim_end_matches(".rs");
        let decl = format!("pub mod {name};");
        let Some(idx) = lines.iter().position(|l| *l == decl) else {
            ungated.push(format!("{name} (not declared)"));
            continue;
        };
        if idx == 0 || lines[idx - 1] != "#[cfg(feature = \"browser\")]" {
            ungated.push(name.to_string());
        }
    }
    assert!(ungated.is_empty(), "modules compiled without the browser feature: {ungated:?}");
}

//! Layering guardrails for the workspace crates.
//!
//! `dataklass_core` is the shared vocabulary of the engine and the derive macro and must stay
//! dependency-free. `dataklass_derive` runs at compile time and must not depend on the engine crate
//! (`dataklass`), which itself depends on the derive macro.

/// Dependency names listed in `[dependencies]` of a manifest.
fn main_dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut deps = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            deps.push(name.trim().to_string());
        }
    }
    deps
}

#[test]
fn core_vocabulary_has_no_dependencies() {
    let deps = main_dependencies(include_str!("../crates/dataklass_core/Cargo.toml"));
    assert!(deps.is_empty(), "`dataklass_core` must stay dependency-free, found: {:?}", deps);
}

#[test]
fn derive_does_not_depend_on_engine() {
    let deps = main_dependencies(include_str!("../crates/dataklass_derive/Cargo.toml"));
    assert!(deps.iter().any(|d| d == "dataklass_core"));
    assert!(
        !deps.iter().any(|d| d == "dataklass"),
        "`dataklass_derive` must not depend on the engine crate"
    );
}

#[test]
fn engine_depends_on_shared_vocabulary() {
    let deps = main_dependencies(include_str!("../Cargo.toml"));
    assert!(deps.iter().any(|d| d == "dataklass_core"));
    assert!(deps.iter().any(|d| d == "dataklass_derive"));
}

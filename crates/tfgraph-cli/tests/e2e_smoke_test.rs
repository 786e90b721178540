use std::{fs, path::PathBuf};

use tempfile::tempdir;

use tfgraph_cli::{Args, run};

/// Collects all .toml manifests from a directory
fn collect_manifests(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo manifests live at the workspace root
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_manifests() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let manifests = collect_manifests(demos_path());

    assert!(!manifests.is_empty(), "No manifests found in demos/");

    let mut failed = Vec::new();

    for manifest in &manifests {
        let output_path = temp_dir.path().join(format!(
            "{}.out.toml",
            manifest.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args_for(manifest, output_path.clone())) {
            Ok(()) => {
                let written = fs::read_to_string(&output_path).expect("output written");
                assert!(written.contains("[geometry]"), "{} has no geometry", manifest.display());
            }
            Err(e) => failed.push((manifest.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nManifests that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} manifest(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_manifests() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let manifests = collect_manifests(demos_path().join("errors"));

    assert!(!manifests.is_empty(), "No error manifests found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for manifest in &manifests {
        let output_path = temp_dir.path().join(format!(
            "error_{}.toml",
            manifest.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args_for(manifest, output_path)).is_ok() {
            unexpectedly_succeeded.push(manifest.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError manifests that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error manifest(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_web_stack_model() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("web_stack.toml");
    let output_path = temp_dir.path().join("web_stack.toml");

    run(&args_for(&input, output_path.clone())).expect("web stack renders");

    let written = fs::read_to_string(&output_path).expect("output written");
    let model: toml::Table = toml::from_str(&written).expect("output is valid TOML");

    let network = model["network"].as_table().expect("network table");
    assert_eq!(network["display_name"].as_str(), Some("shop-prod-vpc"));
    assert_eq!(network["zones"].as_array().map(Vec::len), Some(3));

    let services = model["services"].as_array().expect("services array");
    let keys: Vec<_> = services.iter().filter_map(|s| s["id"].as_str()).collect();
    assert_eq!(keys, vec!["cloudfront", "alb", "ecs", "rds", "s3", "sqs", "kms"]);
}

#[test]
fn e2e_missing_config_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("empty.toml");

    let args = Args {
        config: Some(temp_dir.path().join("nope.toml").to_string_lossy().to_string()),
        ..args_for(&input, temp_dir.path().join("out.toml"))
    };

    assert!(run(&args).is_err());
}

use super::*;

use std::fs;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files.iter().map(|file| relative_key(root, file)).collect()
}

#[test]
fn recognizes_source_files() {
    assert!(is_source_file(Path::new("src/Button.tsx")));
    assert!(is_source_file(Path::new("Title.vue")));
    assert!(is_source_file(Path::new("Hello.svelte")));
    assert!(is_source_file(Path::new("legacy.js")));
    assert!(!is_source_file(Path::new("types.d.ts")));
    assert!(!is_source_file(Path::new("styles.css")));
    assert!(!is_source_file(Path::new("README")));
}

#[test]
fn walks_the_root_in_a_stable_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for file in [
        "src/components/Button.tsx",
        "src/components/Button.stories.tsx",
        "src/App.vue",
        "src/env.d.ts",
        "src/styles.css",
        "node_modules/react/index.js",
        ".storybook/main.ts",
        "dist/bundle.js",
        "index.ts",
    ] {
        touch(root, file);
    }

    let files = discover_files(root, &build_exclude(&[]).unwrap());
    assert_eq!(
        relative(root, &files),
        vec![
            "index.ts",
            "src/App.vue",
            "src/components/Button.stories.tsx",
            "src/components/Button.tsx",
        ]
    );
}

#[test]
fn exclude_globs_match_root_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for file in ["src/Button.tsx", "src/Button.test.tsx", "legacy/Old.tsx", "legacy/deep/Older.tsx"] {
        touch(root, file);
    }

    let exclude = build_exclude(&["**/*.test.tsx".to_string(), "legacy".to_string()]).unwrap();
    let files = discover_files(root, &exclude);
    assert_eq!(relative(root, &files), vec!["src/Button.tsx"]);
}

#[test]
fn invalid_globs_are_reported() {
    let err = build_exclude(&["src/[".to_string()]).unwrap_err();
    assert!(err.to_string().contains("src/["), "{err}");
}

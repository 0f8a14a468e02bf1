use super::*;
use crate::reader::MemoryReader;

#[test]
fn parses_jsonc_with_comments_and_trailing_commas() {
    let source = r#"{
        // editor settings live elsewhere
        "compilerOptions": {
            "jsx": "react-jsx", /* automatic runtime */
            "allowJs": "true",
        },
    }"#;
    let config = parse_tsconfig(source, Path::new("/app/tsconfig.json")).expect("parse");
    let options = CompilerOptions::resolve(config.compiler_options.expect("options")).expect("ok");
    assert_eq!(options.jsx, Some(JsxMode::ReactJsx));
    assert!(options.allow_js);
    assert_eq!(options.jsx_namespace_module(), Some("react"));
}

#[test]
fn extends_chain_merges_child_over_base() {
    let reader = MemoryReader::with_files([
        (
            "/app/tsconfig.base.json",
            r#"{ "compilerOptions": { "jsx": "preserve", "baseUrl": "./src", "moduleResolution": "node" } }"#,
        ),
        (
            "/app/packages/ui/tsconfig.json",
            r#"{ "extends": "../../tsconfig.base", "compilerOptions": { "jsxImportSource": "preact" } }"#,
        ),
    ]);
    let options =
        CompilerOptions::from_tsconfig_with(&reader, Path::new("/app/packages/ui/tsconfig.json"))
            .expect("load");
    assert_eq!(options.jsx, Some(JsxMode::Preserve));
    assert_eq!(options.jsx_import_source.as_deref(), Some("preact"));
    assert_eq!(options.jsx_namespace_module(), Some("preact"));
    assert_eq!(options.module_resolution, ModuleResolutionKind::Node10);
    // baseUrl is relative to the config that declares it.
    assert_eq!(options.base_url, Some(PathBuf::from("/app/src")));
}

#[test]
fn extends_resolves_package_configs_from_node_modules() {
    let reader = MemoryReader::with_files([
        (
            "/app/node_modules/@tsconfig/strictest/tsconfig.json",
            r#"{ "compilerOptions": { "allowJs": true } }"#,
        ),
        (
            "/app/tsconfig.json",
            r#"{ "extends": "@tsconfig/strictest/tsconfig.json" }"#,
        ),
    ]);
    let options = CompilerOptions::from_tsconfig_with(&reader, Path::new("/app/tsconfig.json"))
        .expect("load");
    assert!(options.allow_js);
}

#[test]
fn extends_cycle_is_an_error() {
    let reader = MemoryReader::with_files([
        ("/app/a.json", r#"{ "extends": "./b.json" }"#),
        ("/app/b.json", r#"{ "extends": "./a.json" }"#),
    ]);
    let err = load_tsconfig(&reader, Path::new("/app/a.json")).expect_err("cycle");
    assert!(matches!(err, ConfigError::ExtendsCycle { .. }));
}

#[test]
fn missing_config_reports_not_found() {
    let reader = MemoryReader::new();
    let err = load_tsconfig(&reader, Path::new("/nope/tsconfig.json")).expect_err("missing");
    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert!(err.to_string().contains("/nope/tsconfig.json"));
}

#[test]
fn invalid_option_value_is_rejected() {
    let raw = RawCompilerOptions {
        module_resolution: Some("quantum".into()),
        ..Default::default()
    };
    let err = CompilerOptions::resolve(raw).expect_err("invalid");
    assert_eq!(
        err.to_string(),
        "unsupported compilerOptions.moduleResolution 'quantum'"
    );
}

#[test]
fn path_mappings_sort_most_specific_first() {
    let source = r#"{ "compilerOptions": { "paths": {
        "@/*": ["src/*"],
        "@/components/*": ["src/components/*"],
        "exact": ["lib/exact.ts"]
    } } }"#;
    let reader = MemoryReader::with_files([("/app/tsconfig.json", source)]);
    let options = CompilerOptions::from_tsconfig_with(&reader, Path::new("/app/tsconfig.json"))
        .expect("load");
    let patterns: Vec<_> = options.paths.iter().map(|p| p.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["@/components/*", "exact", "@/*"]);
    assert_eq!(options.paths_base_dir, Some(PathBuf::from("/app")));
    assert_eq!(
        options.paths[0].match_specifier("@/components/Button"),
        Some("Button".to_string())
    );
    assert_eq!(options.paths[1].match_specifier("exact"), Some(String::new()));
    assert_eq!(options.paths[2].match_specifier("other"), None);
}

#[test]
fn module_kind_implies_resolution() {
    let raw = RawCompilerOptions {
        module: Some("NodeNext".into()),
        ..Default::default()
    };
    let options = CompilerOptions::resolve(raw).expect("ok");
    assert_eq!(options.module_resolution, ModuleResolutionKind::NodeNext);
    assert!(options.module_resolution.uses_exports());
}

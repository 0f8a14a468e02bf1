use super::*;
use crate::reader::MemoryReader;

fn resolver(files: &[(&str, &str)], options: CompilerOptions) -> ModuleResolver {
    let reader = Arc::new(MemoryReader::with_files(files.iter().copied()));
    ModuleResolver::new(&options, reader)
}

fn resolve(resolver: &ModuleResolver, specifier: &str, from: &str) -> Option<PathBuf> {
    resolver
        .resolve(specifier, Path::new(from))
        .ok()
        .map(|m| m.resolved_path)
}

#[test]
fn relative_imports_try_typescript_extensions_and_index() {
    let r = resolver(
        &[
            ("/app/src/Button.tsx", ""),
            ("/app/src/forms/index.ts", ""),
            ("/app/src/types.d.ts", ""),
        ],
        CompilerOptions::default(),
    );
    assert_eq!(
        resolve(&r, "./Button", "/app/src/App.tsx"),
        Some(PathBuf::from("/app/src/Button.tsx"))
    );
    assert_eq!(
        resolve(&r, "./forms", "/app/src/App.tsx"),
        Some(PathBuf::from("/app/src/forms/index.ts"))
    );
    assert_eq!(
        resolve(&r, "../src/types", "/app/src/App.tsx"),
        Some(PathBuf::from("/app/src/types.d.ts"))
    );
}

#[test]
fn js_extension_in_specifier_maps_to_typescript_source() {
    let r = resolver(&[("/app/src/Button.tsx", "")], CompilerOptions::default());
    assert_eq!(
        resolve(&r, "./Button.js", "/app/src/index.ts"),
        Some(PathBuf::from("/app/src/Button.tsx"))
    );
}

#[test]
fn dotted_file_names_keep_their_stem() {
    let r = resolver(&[("/app/src/Button.stories.tsx", "")], CompilerOptions::default());
    assert_eq!(
        resolve(&r, "./Button.stories", "/app/src/index.ts"),
        Some(PathBuf::from("/app/src/Button.stories.tsx"))
    );
}

#[test]
fn single_file_components_resolve_by_explicit_extension() {
    let r = resolver(&[("/app/src/Card.vue", "")], CompilerOptions::default());
    let resolved = r
        .resolve("./Card.vue", Path::new("/app/src/Card.stories.ts"))
        .expect("resolved");
    assert_eq!(resolved.extension, ModuleExtension::Vue);
    assert!(resolved.extension.is_single_file_component());
}

#[test]
fn javascript_requires_allow_js() {
    let files = [("/app/src/legacy.jsx", "")];
    let strict = resolver(&files, CompilerOptions::default());
    assert_eq!(resolve(&strict, "./legacy", "/app/src/a.ts"), None);
    let loose = resolver(
        &files,
        CompilerOptions {
            allow_js: true,
            ..Default::default()
        },
    );
    assert_eq!(
        resolve(&loose, "./legacy", "/app/src/a.ts"),
        Some(PathBuf::from("/app/src/legacy.jsx"))
    );
}

#[test]
fn packages_resolve_types_entry_and_types_fallback() {
    let r = resolver(
        &[
            (
                "/app/node_modules/ui-kit/package.json",
                r#"{ "name": "ui-kit", "main": "dist/index.js", "types": "dist/index.d.ts" }"#,
            ),
            ("/app/node_modules/ui-kit/dist/index.d.ts", ""),
            ("/app/node_modules/@types/react/index.d.ts", ""),
            ("/app/node_modules/@types/react/package.json", r#"{ "name": "@types/react" }"#),
        ],
        CompilerOptions::default(),
    );
    let ui = r
        .resolve("ui-kit", Path::new("/app/src/deep/App.tsx"))
        .expect("ui-kit");
    assert_eq!(ui.resolved_path, PathBuf::from("/app/node_modules/ui-kit/dist/index.d.ts"));
    assert!(ui.is_external);
    assert_eq!(ui.package_name.as_deref(), Some("ui-kit"));
    assert_eq!(
        resolve(&r, "react", "/app/src/App.tsx"),
        Some(PathBuf::from("/app/node_modules/@types/react/index.d.ts"))
    );
}

#[test]
fn package_exports_prefer_types_condition() {
    let r = resolver(
        &[
            (
                "/app/node_modules/lib/package.json",
                r#"{ "exports": {
                    ".": { "types": "./types/index.d.ts", "default": "./index.js" },
                    "./icons/*": { "types": "./types/icons/*.d.ts" }
                } }"#,
            ),
            ("/app/node_modules/lib/types/index.d.ts", ""),
            ("/app/node_modules/lib/types/icons/Star.d.ts", ""),
        ],
        CompilerOptions::default(),
    );
    assert_eq!(
        resolve(&r, "lib", "/app/a.ts"),
        Some(PathBuf::from("/app/node_modules/lib/types/index.d.ts"))
    );
    assert_eq!(
        resolve(&r, "lib/icons/Star", "/app/a.ts"),
        Some(PathBuf::from("/app/node_modules/lib/types/icons/Star.d.ts"))
    );
}

#[test]
fn path_mappings_win_over_node_modules() {
    let options = CompilerOptions {
        paths: vec![PathMapping::new("@/*", vec!["src/*".into()])],
        paths_base_dir: Some(PathBuf::from("/app")),
        ..Default::default()
    };
    let r = resolver(&[("/app/src/components/Button.tsx", "")], options);
    assert_eq!(
        resolve(&r, "@/components/Button", "/app/src/pages/Home.tsx"),
        Some(PathBuf::from("/app/src/components/Button.tsx"))
    );
    let err = r
        .resolve("@/missing", Path::new("/app/src/a.ts"))
        .expect_err("mapped but missing");
    assert!(matches!(err, ResolutionFailure::PathMappingFailed { .. }));
}

#[test]
fn base_url_resolves_non_relative_specifiers() {
    let options = CompilerOptions {
        base_url: Some(PathBuf::from("/app/src")),
        ..Default::default()
    };
    let r = resolver(&[("/app/src/utils/format.ts", "")], options);
    assert_eq!(
        resolve(&r, "utils/format", "/app/src/pages/a.ts"),
        Some(PathBuf::from("/app/src/utils/format.ts"))
    );
}

#[test]
fn missing_module_is_not_found() {
    let r = resolver(&[], CompilerOptions::default());
    let err = r
        .resolve("./nope", Path::new("/app/a.ts"))
        .expect_err("missing");
    assert!(err.is_not_found());
    assert_eq!(err.containing_file(), "/app/a.ts");
}

#[test]
fn package_specifier_parsing() {
    assert_eq!(parse_package_specifier("react"), ("react".into(), None));
    assert_eq!(
        parse_package_specifier("react/jsx-runtime"),
        ("react".into(), Some("jsx-runtime".into()))
    );
    assert_eq!(
        parse_package_specifier("@scope/pkg/sub/path"),
        ("@scope/pkg".into(), Some("sub/path".into()))
    );
    assert_eq!(types_package_name("@scope/pkg"), "@types/scope__pkg");
}

#[test]
fn package_name_from_node_modules_path() {
    assert_eq!(
        package_name_from_path(Path::new("/app/node_modules/@types/react/index.d.ts")).as_deref(),
        Some("react")
    );
    assert_eq!(
        package_name_from_path(Path::new("/app/node_modules/@mui/material/Button/index.d.ts"))
            .as_deref(),
        Some("@mui/material")
    );
    assert_eq!(package_name_from_path(Path::new("/app/src/a.ts")), None);
}

use super::*;

use tspreview_checker::{FsReader, MemoryReader};
use tspreview_types::SerializableValue;

const BUTTON: &str = "export function Button(props: { label: string; onClick: () => void }) { return null; }";

const STORIES: &str = "import { Button } from \"./Button\";\n\
export default { component: Button, args: { label: \"Meta\" } };\n\
export const Primary = { args: { label: \"Primary\" } };\n";

fn analyzer_with(files: &[(&str, &str)]) -> (Analyzer, Arc<MemoryReader>) {
    let reader = Arc::new(MemoryReader::with_files(files.iter().copied()));
    let analyzer = Analyzer::new(AnalyzerConfig::new("/app"), reader.clone());
    (analyzer, reader)
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[tokio::test]
async fn analyze_collects_components_and_stories() {
    let (analyzer, _) = analyzer_with(&[("/app/Button.tsx", BUTTON), ("/app/Button.stories.tsx", STORIES)]);
    let set = analyzer
        .analyze(&paths(&["/app/Button.tsx", "/app/Button.stories.tsx", "/app/Missing.tsx"]))
        .await;

    assert_eq!(set.len(), 2);
    let button = set.component("Button.tsx:Button").unwrap();
    assert!(button.exported());
    let story = set.story("Button.stories.tsx:Primary").unwrap();
    assert_eq!(story.associated_component().unwrap().id(), button.id());
    assert!(set.find("Button.stories.tsx:Primary").is_some());
    assert!(set.find("Button.tsx:Nope").is_none());
}

#[tokio::test]
async fn thunks_resolve_on_demand() {
    let (analyzer, _) = analyzer_with(&[("/app/Button.tsx", BUTTON), ("/app/Button.stories.tsx", STORIES)]);
    let set = analyzer
        .analyze(&paths(&["/app/Button.tsx", "/app/Button.stories.tsx"]))
        .await;

    let (props, example) = set.components[0].example_props().await.unwrap();
    assert_eq!(props.props.to_string(), "{ label: string; onClick: Function }");
    assert!(props.warnings.is_empty());
    let SerializableValue::Object(fields) = &example else {
        panic!("expected an object, got {example:?}");
    };
    assert_eq!(fields["label"], SerializableValue::string(""));
    assert!(fields["onClick"].is_function());

    let args = set.stories[0].extract_args().await.unwrap().unwrap();
    let SerializableValue::Object(fields) = &args.value else {
        panic!("expected an object");
    };
    assert_eq!(fields["label"], SerializableValue::string("Primary"));
}

#[tokio::test]
async fn concurrent_extractions_queue_on_the_workspace() {
    let (analyzer, _) = analyzer_with(&[("/app/Button.tsx", BUTTON)]);
    let set = analyzer.analyze(&paths(&["/app/Button.tsx"])).await;
    let component = set.components[0].clone();

    let (a, b, c) = tokio::join!(
        component.extract_props(),
        set.components[0].extract_props(),
        component.extract_props(),
    );
    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
}

#[tokio::test]
async fn invalidation_is_queued_until_the_next_operation() {
    let (analyzer, reader) = analyzer_with(&[("/app/Button.tsx", BUTTON)]);
    let set = analyzer.analyze(&paths(&["/app/Button.tsx"])).await;
    let old = set.components[0].clone();

    reader.update(
        "/app/Button.tsx",
        "export function Badge(props: { tone: string }) { return null; }",
    );
    // Without an invalidation the cached crawl is still served.
    assert!(old.extract_props().await.is_ok());

    analyzer.invalidate(Path::new("/app/./Button.tsx"));
    assert_eq!(analyzer.pending_invalidations(), vec![PathBuf::from("/app/Button.tsx")]);

    let err = old.extract_props().await.unwrap_err();
    assert!(matches!(err, AnalyzerError::Vanished { ref id } if id == "Button.tsx:Button"));
    assert!(analyzer.pending_invalidations().is_empty());

    let set = analyzer.analyze(&paths(&["/app/Button.tsx"])).await;
    assert_eq!(set.components[0].id(), "Button.tsx:Badge");
    assert_eq!(
        set.components[0].extract_props().await.unwrap().props.to_string(),
        "{ tone: string }"
    );
}

#[tokio::test]
async fn invalidating_a_component_recrawls_its_stories() {
    let (analyzer, reader) = analyzer_with(&[("/app/Button.tsx", BUTTON), ("/app/Button.stories.tsx", STORIES)]);
    let files = paths(&["/app/Button.stories.tsx"]);
    let set = analyzer.analyze(&files).await;
    assert!(set.stories[0].associated_component().is_some());

    reader.update("/app/Button.tsx", "export const Button = 42;");
    analyzer.invalidate(Path::new("/app/Button.tsx"));

    let set = analyzer.analyze(&files).await;
    assert!(set.stories[0].associated_component().is_none());
}

#[tokio::test]
async fn props_errors_carry_the_previewable_id() {
    let (analyzer, _) = analyzer_with(&[(
        "/app/Wrapped.tsx",
        "export const Wrapped = observer(Missing);",
    )]);
    let set = analyzer.analyze(&paths(&["/app/Wrapped.tsx"])).await;
    let err = set.components[0].extract_props().await.unwrap_err();
    assert!(matches!(err, AnalyzerError::Props { ref id, .. } if id == "Wrapped.tsx:Wrapped"));
    assert!(err.to_string().starts_with("cannot extract props of `Wrapped.tsx:Wrapped`"));
}

#[tokio::test]
async fn single_file_component_props() {
    let (analyzer, _) = analyzer_with(&[
        (
            "/app/Title.vue",
            "<script setup lang=\"ts\">\ndefineProps<{ title: string }>();\n</script>\n<template />",
        ),
        (
            "/app/Hello.svelte",
            "<script lang=\"ts\">\nexport let name: string;\nexport let count = 0;\n</script>",
        ),
    ]);
    let set = analyzer
        .analyze(&paths(&["/app/Title.vue", "/app/Hello.svelte"]))
        .await;
    let title = set.component("Title.vue:default").unwrap();
    assert_eq!(
        title.extract_props().await.unwrap().props.to_string(),
        "{ title: string }"
    );
    let hello = set.component("Hello.svelte:default").unwrap();
    assert_eq!(
        hello.extract_props().await.unwrap().props.to_string(),
        "{ name: string; count?: number }"
    );
}

#[tokio::test]
async fn analyzes_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app");
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("src/Button.tsx"), BUTTON).unwrap();

    let analyzer = Analyzer::new(AnalyzerConfig::new(&root), Arc::new(FsReader));
    let set = analyzer.analyze(&[root.join("src/Button.tsx")]).await;
    assert_eq!(set.components[0].id(), "src/Button.tsx:Button");

    let _watcher = analyzer.watch().unwrap();
    let missing = Analyzer::new(AnalyzerConfig::new(root.join("missing")), Arc::new(FsReader));
    assert!(matches!(missing.watch(), Err(AnalyzerError::Watch(_))));
}

#[test]
fn config_builders() {
    let config = AnalyzerConfig::new("/app")
        .with_framework(Framework::Vue)
        .with_policy(SynthesisPolicy::default().with_union(tspreview_synth::UnionPolicy::Simplest));
    assert_eq!(config.framework, Framework::Vue);
    assert_eq!(config.policy.union, tspreview_synth::UnionPolicy::Simplest);
    assert_eq!(config.root_dir, PathBuf::from("/app"));
}

use super::*;

use std::fs;

use tspreview_resolver::Framework;
use tspreview_synth::{OptionalFieldPolicy, UnionPolicy};
use tspreview_types::SerializableValue;

const BUTTON: &str = "export function Button(props: { label: string; onClick: () => void }) { return null; }\n";

const STORIES: &str = "import { Button } from \"./Button\";\n\
export default { component: Button };\n\
export const Primary = { args: { label: \"Primary\" } };\n";

fn project_args(root: &Path) -> ProjectArgs {
    ProjectArgs {
        root: root.to_path_buf(),
        framework: Framework::React,
        tsconfig: None,
        exclude: Vec::new(),
        union: UnionPolicy::FirstMember,
        optional_fields: OptionalFieldPolicy::CheapOnly,
        json: false,
        no_color: true,
    }
}

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/Button.tsx"), BUTTON).unwrap();
    fs::write(root.join("src/Button.stories.tsx"), STORIES).unwrap();
}

#[tokio::test]
async fn crawls_every_discovered_file() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(&project_args(dir.path())).unwrap();

    let set = project.crawl(&[]).await.unwrap();
    assert_eq!(set.components.len(), 1);
    assert_eq!(set.components[0].id(), "src/Button.tsx:Button");
    assert_eq!(set.stories[0].id(), "src/Button.stories.tsx:Primary");
}

#[tokio::test]
async fn excluded_files_are_not_crawled() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let mut args = project_args(dir.path());
    args.exclude = vec!["**/*.stories.tsx".to_string()];
    let project = Project::open(&args).unwrap();

    let set = project.crawl(&[]).await.unwrap();
    assert_eq!(set.components.len(), 1);
    assert!(set.stories.is_empty());
}

#[tokio::test]
async fn props_of_a_component() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(&project_args(dir.path())).unwrap();

    let report = project.props("src/Button.tsx:Button").await.unwrap();
    assert_eq!(
        report.props.as_ref().unwrap().props.to_string(),
        "{ label: string; onClick: Function }"
    );
    assert!(report.args.is_none());
    assert_eq!(
        report.assignment,
        "const autogenCallbackProps = { onClick: (...args) => console.log(\"onClick\", ...args) };\n\
         const properties = { label: \"\" };\n"
    );
}

#[tokio::test]
async fn story_args_override_synthesized_props() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(&project_args(dir.path())).unwrap();

    let report = project.props("src/Button.stories.tsx:Primary").await.unwrap();
    assert!(report.props.is_some());
    let fields = report.example.as_object().unwrap();
    assert_eq!(fields["label"], SerializableValue::string("Primary"));
    assert!(fields["onClick"].is_function());
}

#[tokio::test]
async fn unknown_ids_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(&project_args(dir.path())).unwrap();

    let err = project.props("src/Button.tsx:Missing").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "no component or story with id `src/Button.tsx:Missing`"
    );
    let err = project.props("Button").await.unwrap_err();
    assert!(err.to_string().contains("not a previewable id"), "{err}");
}

#[test]
fn tsconfig_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    assert_eq!(resolve_tsconfig_path(root, None), None);
    assert_eq!(
        resolve_tsconfig_path(root, Some(Path::new("/elsewhere/tsconfig.json"))),
        Some(PathBuf::from("/elsewhere/tsconfig.json"))
    );
    fs::write(root.join("tsconfig.json"), "{}").unwrap();
    assert_eq!(resolve_tsconfig_path(root, None), Some(root.join("tsconfig.json")));
}

#[test]
fn open_reports_setup_failures() {
    let dir = tempfile::tempdir().unwrap();

    let err = Project::open(&project_args(&dir.path().join("missing"))).err().unwrap();
    assert!(err.to_string().starts_with("project root"), "{err}");

    fs::write(dir.path().join("tsconfig.json"), "{ \"compilerOptions\": ").unwrap();
    let err = Project::open(&project_args(dir.path())).err().unwrap();
    assert!(err.to_string().starts_with("failed to load"), "{err}");

    fs::write(dir.path().join("tsconfig.json"), "{ // comments are fine\n}").unwrap();
    assert!(Project::open(&project_args(dir.path())).is_ok());
}

#[tokio::test]
async fn text_output_locates_previewables_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());
    let project = Project::open(&project_args(dir.path())).unwrap();

    let set = project.crawl(&[]).await.unwrap();
    let text = crate::report::Reporter::new(false).render_set(&set);
    assert_eq!(
        text,
        "component src/Button.tsx:Button (1:1)\n\
         story     src/Button.stories.tsx:Primary (3:14) -> src/Button.tsx:Button\n\
         1 components, 1 stories\n"
    );
}

use super::*;

use std::path::PathBuf;
use std::sync::Arc;

use tspreview_checker::MemoryReader;
use tspreview_crawler::{Analyzer, AnalyzerConfig};

const FILES: &[(&str, &str)] = &[
    (
        "/app/Button.tsx",
        "export function Button(props: { label: string; tone?: Tone }) { return null; }\n\
         type Tone = \"light\" | \"dark\";\n\
         const Inner = () => null;\n",
    ),
    (
        "/app/Button.stories.tsx",
        "import { Button } from \"./Button\";\n\
         const Template = (args) => null;\n\
         export const Bound = Template.bind({});\n\
         Bound.args = { label: \"Bound\" };\n\
         export const Linked = { render: () => null };\n\
         export default { component: Button };\n",
    ),
];

async fn analyze() -> PreviewableSet {
    let reader = Arc::new(MemoryReader::with_files(FILES.iter().copied()));
    let analyzer = Analyzer::new(AnalyzerConfig::new("/app"), reader);
    analyzer
        .analyze(&[
            PathBuf::from("/app/Button.tsx"),
            PathBuf::from("/app/Button.stories.tsx"),
        ])
        .await
}

#[tokio::test]
async fn renders_a_crawl_without_color() {
    let set = analyze().await;
    let text = Reporter::new(false).render_set(&set);
    assert_eq!(
        text,
        "component Button.tsx:Button\n\
         component Button.tsx:Inner (local)\n\
         component Button.stories.tsx:Template (local)\n\
         story     Button.stories.tsx:Bound [Template.bind] -> Button.tsx:Button\n\
         story     Button.stories.tsx:Linked -> Button.tsx:Button\n\
         3 components, 2 stories\n"
    );
}

#[tokio::test]
async fn props_reports_for_components_and_stories() {
    let set = analyze().await;
    let policy = SynthesisPolicy::default();

    let component = set.find("Button.tsx:Button").unwrap();
    let report = PropsReport::collect(&component, policy).await.unwrap();
    let props = report.props.as_ref().unwrap();
    assert!(report.args.is_none());
    assert_eq!(report.example, props.example(policy));

    let story = set.find("Button.stories.tsx:Bound").unwrap();
    let report = PropsReport::collect(&story, policy).await.unwrap();
    assert_eq!(
        report.args.as_ref().unwrap().value.as_object().unwrap()["label"],
        SerializableValue::string("Bound")
    );
    assert_eq!(
        report.example.as_object().unwrap()["label"],
        SerializableValue::string("Bound")
    );
    assert!(report.assignment.contains("label: \"Bound\""));

    let text = Reporter::new(false).render_props(&report);
    assert!(text.starts_with("Button.stories.tsx:Bound\n  props: { label: string; tone?: "), "{text}");
    assert!(text.ends_with(&report.assignment));
}

#[tokio::test]
async fn json_report_uses_camel_case() {
    let set = analyze().await;
    let story = set.find("Button.stories.tsx:Linked").unwrap();
    let report = PropsReport::collect(&story, SynthesisPolicy::default()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["id"], "Button.stories.tsx:Linked");
    assert!(json.get("args").is_none());
    assert!(json["props"]["props"].is_object());
    assert!(json["assignment"].as_str().unwrap().starts_with("const autogenCallbackProps"));
}

#[test]
fn colored_output_only_when_enabled() {
    let set = PreviewableSet::default();
    assert_eq!(Reporter::new(false).render_set(&set), "0 components, 0 stories\n");
}

use super::*;

use tspreview_checker::{CompilerOptions, MemoryReader, Program};

use crate::sfc::SfcScriptExtractor;

fn program(files: &[(&str, &str)]) -> Program {
    let reader = Arc::new(MemoryReader::with_files(files.iter().copied()));
    Program::new("/app", CompilerOptions::default(), reader)
        .with_script_extractor(Arc::new(SfcScriptExtractor))
}

fn crawl(files: &[(&str, &str)], path: &str) -> Arc<FileCrawl> {
    let program = program(files);
    let mut cache = CrawlCache::default();
    PreviewableCrawler::new(&program, &mut cache).crawl(Path::new(path))
}

fn component_ids(crawl: &FileCrawl) -> Vec<&str> {
    crawl.components.iter().map(|c| c.id.as_str()).collect()
}

fn story_ids(crawl: &FileCrawl) -> Vec<&str> {
    crawl.stories.iter().map(|s| s.id.as_str()).collect()
}

fn object(fields: &[(&str, SerializableValue)]) -> SerializableValue {
    SerializableValue::Object(
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}

const COMPONENTS: &str = "import { memo, Component } from 'react';\n\
export function Button(props: { label: string }) { return null; }\n\
export const Card = ({ title }: { title: string }) => null;\n\
const Hidden = (props: {}) => null;\n\
const Internal = () => null;\n\
function helper(a, b, c) { return null; }\n\
export const lowercase = () => null;\n\
export const Memo = memo(Card);\n\
export class Dialog extends Component<{}> { render() { return null; } }\n\
class Plain {}\n\
export const VALUE = 42;\n\
export { Hidden as Revealed };\n";

#[test]
fn classifies_component_declarations() {
    let crawl = crawl(&[("/app/src/Button.tsx", COMPONENTS)], "/app/src/Button.tsx");
    assert_eq!(
        component_ids(&crawl),
        vec![
            "src/Button.tsx:Button",
            "src/Button.tsx:Card",
            "src/Button.tsx:Revealed",
            "src/Button.tsx:Internal",
            "src/Button.tsx:Memo",
            "src/Button.tsx:Dialog",
        ]
    );
    assert!(crawl.stories.is_empty());

    let internal = crawl.component("src/Button.tsx:Internal").unwrap();
    assert!(!internal.exported);
    assert_eq!(internal.lookup_name, "Internal");
    let revealed = crawl.component("src/Button.tsx:Revealed").unwrap();
    assert!(revealed.exported);
    assert_eq!(revealed.lookup_name, "Revealed");
}

#[test]
fn source_positions_cover_the_declaration() {
    let crawl = crawl(&[("/app/Button.tsx", COMPONENTS)], "/app/Button.tsx");
    let card = crawl.component("Button.tsx:Card").unwrap();
    let text = &COMPONENTS[card.source_position.start as usize..card.source_position.end as usize];
    assert!(text.starts_with("Card = "), "{text}");
    let button = crawl.component("Button.tsx:Button").unwrap();
    let text = &COMPONENTS[button.source_position.start as usize..button.source_position.end as usize];
    assert!(text.starts_with("export function Button"), "{text}");
}

#[test]
fn default_exports() {
    let anonymous = crawl(
        &[("/app/Logo.tsx", "export default function () { return null; }")],
        "/app/Logo.tsx",
    );
    assert_eq!(component_ids(&anonymous), vec!["Logo.tsx:default"]);

    let by_name = crawl(
        &[(
            "/app/Logo.tsx",
            "const Logo = (props: { size: number }) => null;\nexport default Logo;",
        )],
        "/app/Logo.tsx",
    );
    assert_eq!(component_ids(&by_name), vec!["Logo.tsx:default"]);
    assert_eq!(by_name.components[0].lookup_name, "default");

    let wrapped = crawl(
        &[("/app/Logo.tsx", "export default memo((props: { size: number }) => null);")],
        "/app/Logo.tsx",
    );
    assert_eq!(component_ids(&wrapped), vec!["Logo.tsx:default"]);
}

#[test]
fn bound_template_stories() {
    let source = "const Template = (args) => null;\n\
                  export const Primary = Template.bind({});\n\
                  Primary.args = { label: \"Primary\", onClick: () => {} };\n\
                  export const Secondary = Template.bind({});\n";
    let crawl = crawl(&[("/app/Button.stories.tsx", source)], "/app/Button.stories.tsx");

    assert_eq!(story_ids(&crawl), vec!["Button.stories.tsx:Primary"]);
    let primary = &crawl.stories[0];
    assert_eq!(
        primary.declaration,
        StoryDeclaration::BoundTemplate {
            template: Some("Template".to_string())
        }
    );
    assert!(primary.associated_component.is_none());

    let args = primary.args.as_ref().unwrap();
    assert_eq!(
        args.value,
        object(&[
            ("label", SerializableValue::string("Primary")),
            (
                "onClick",
                SerializableValue::Function {
                    source: Some("() => {}".to_string())
                }
            ),
        ])
    );
    assert_eq!(
        &source[args.source_position.start as usize..args.source_position.end as usize],
        "{ label: \"Primary\", onClick: () => {} }"
    );
    // The template itself is an unexported component.
    assert_eq!(component_ids(&crawl), vec!["Button.stories.tsx:Template"]);
}

#[test]
fn components_with_static_args_preview_themselves() {
    let crawl = crawl(
        &[(
            "/app/Button.tsx",
            "export function Button(props: { label: string }) { return null; }\n\
             Button.args = { label: \"Hi\" };",
        )],
        "/app/Button.tsx",
    );
    assert!(crawl.components.is_empty());
    let story = &crawl.stories[0];
    assert_eq!(story.id, "Button.tsx:Button");
    assert_eq!(story.declaration, StoryDeclaration::BoundTemplate { template: None });
    assert_eq!(
        story.associated_component.as_ref().unwrap().id,
        "Button.tsx:Button"
    );
    assert_eq!(
        story.args.as_ref().unwrap().value,
        object(&[("label", SerializableValue::string("Hi"))])
    );
}

const BUTTON: &str = "export function Button(props: { label: string; size?: string }) { return null; }\n\
                      Button.args = { label: \"Hi\" };";

const BUTTON_STORIES: &str = "import { Button } from \"./Button\";\n\
const meta = {\n\
  component: Button,\n\
  args: { label: \"Meta\", size: \"md\" },\n\
  excludeStories: [\"helperData\"],\n\
};\n\
export default meta;\n\
export const Primary = { args: { label: \"Primary\" } };\n\
export const Plain = {};\n\
export const Rendered = () => null;\n\
export const helperData = { x: 1 };\n";

#[test]
fn object_stories_link_their_component_across_files() {
    let crawl = crawl(
        &[("/app/Button.tsx", BUTTON), ("/app/Button.stories.tsx", BUTTON_STORIES)],
        "/app/Button.stories.tsx",
    );
    assert_eq!(
        story_ids(&crawl),
        vec![
            "Button.stories.tsx:Primary",
            "Button.stories.tsx:Plain",
            "Button.stories.tsx:Rendered",
        ]
    );
    assert!(crawl.components.is_empty());
    for story in &crawl.stories {
        assert_eq!(
            story.associated_component.as_ref().map(|c| c.id.as_str()),
            Some("Button.tsx:Button")
        );
    }

    let [primary, plain, rendered] = crawl.stories.as_slice() else {
        panic!("expected three stories");
    };
    assert_eq!(primary.declaration, StoryDeclaration::ObjectStory);
    assert_eq!(
        primary.args.as_ref().unwrap().value,
        object(&[
            ("label", SerializableValue::string("Primary")),
            ("size", SerializableValue::string("md")),
        ])
    );
    assert_eq!(
        plain.args.as_ref().unwrap().value,
        object(&[
            ("label", SerializableValue::string("Meta")),
            ("size", SerializableValue::string("md")),
        ])
    );
    assert_eq!(
        rendered.declaration,
        StoryDeclaration::BoundTemplate { template: None }
    );
}

#[test]
fn include_stories_filters_exports() {
    let source = "import { Button } from \"./Button\";\n\
                  export default { title: \"Buttons\", component: Button, includeStories: \"Only\" };\n\
                  export const Only = {};\n\
                  export const Skipped = {};\n";
    let crawl = crawl(
        &[("/app/Button.tsx", BUTTON), ("/app/stories.ts", source)],
        "/app/stories.ts",
    );
    assert_eq!(story_ids(&crawl), vec!["stories.ts:Only"]);
    assert!(crawl.stories[0].args.is_none());
}

#[test]
fn linked_files_are_cached_and_reported() {
    let program = program(&[("/app/Button.tsx", BUTTON), ("/app/Button.stories.tsx", BUTTON_STORIES)]);
    let mut cache = CrawlCache::default();
    let mut crawler = PreviewableCrawler::new(&program, &mut cache);
    let first = crawler.crawl(Path::new("/app/Button.stories.tsx"));
    assert_eq!(
        crawler.crawled_paths(),
        [PathBuf::from("/app/Button.tsx"), PathBuf::from("/app/Button.stories.tsx")]
    );
    let again = crawler.crawl(Path::new("/app/./Button.stories.tsx"));
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(crawler.crawled_paths().len(), 2);
    assert!(cache.contains_key(Path::new("/app/Button.tsx")));
}

#[test]
fn cyclic_story_links_terminate() {
    let a = "import { B } from \"./B\";\nexport default { component: B };\nexport function A() { return null; }";
    let b = "import { A } from \"./A\";\nexport default { component: A };\nexport function B() { return null; }";
    let crawl = crawl(&[("/app/A.tsx", a), ("/app/B.tsx", b)], "/app/A.tsx");
    assert_eq!(story_ids(&crawl), vec!["A.tsx:A"]);
    assert_eq!(
        crawl.stories[0].associated_component.as_ref().map(|c| c.id.as_str()),
        Some("B.tsx:B")
    );
}

#[test]
fn single_file_components() {
    let vue = "<template><h1>{{ title }}</h1></template>\n\
               <script setup lang=\"ts\">\ndefineProps<{ title: string }>();\n</script>";
    let vue_crawl = crawl(&[("/app/Title.vue", vue)], "/app/Title.vue");
    assert_eq!(component_ids(&vue_crawl), vec!["Title.vue:default"]);
    let component = &vue_crawl.components[0];
    assert_eq!(component.kind, ComponentKind::Vue);
    assert_eq!(
        component.source_position.start as usize,
        vue.find("\ndefineProps").unwrap()
    );

    let svelte = crawl(
        &[("/app/Hello.svelte", "<script>export let name;</script><h1>{name}</h1>")],
        "/app/Hello.svelte",
    );
    assert_eq!(svelte.components[0].kind, ComponentKind::Svelte);
}

#[test]
fn type_errors_do_not_hide_other_components() {
    let crawl = crawl(
        &[(
            "/app/Mixed.tsx",
            "export function Bad(props: Missing) { return null; }\n\
             export function Good(props: { a: string }) { return null; }",
        )],
        "/app/Mixed.tsx",
    );
    assert_eq!(component_ids(&crawl), vec!["Mixed.tsx:Bad", "Mixed.tsx:Good"]);
}

#[test]
fn unreadable_files_contribute_nothing() {
    let crawl = crawl(&[], "/app/Missing.tsx");
    assert!(crawl.is_empty());
}

#[test]
fn serializes_with_camel_case_keys() {
    let crawl = crawl(&[("/app/Button.tsx", BUTTON)], "/app/Button.tsx");
    let json = serde_json::to_value(&crawl.stories[0]).unwrap();
    assert_eq!(json["id"], "Button.tsx:Button");
    assert_eq!(json["declaration"]["convention"], "bound-template");
    assert_eq!(json["associatedComponent"]["kind"], "script");
    assert!(json["sourcePosition"]["start"].is_u64());
}

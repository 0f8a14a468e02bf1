use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tspreview_common::{ByteSpan, LineMap};
use tspreview_crawler::{
    AnalyzerError, ComponentProps, Previewable, PreviewableSet, StoryArgs, StoryDeclaration,
};
use tspreview_synth::{SynthesisPolicy, generate_props_assignment};
use tspreview_types::SerializableValue;

/// Everything `tspreview props` knows about one previewable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropsReport {
    pub id: String,
    /// Props of the component, or of the story's associated component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<ComponentProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<StoryArgs>,
    /// Synthesized props with any story args laid over them.
    pub example: SerializableValue,
    /// The snippet a renderer evaluates before rendering.
    pub assignment: String,
}

impl PropsReport {
    pub async fn collect(
        previewable: &Previewable,
        policy: SynthesisPolicy,
    ) -> Result<Self, AnalyzerError> {
        let (props, args) = match previewable {
            Previewable::Component(component) => (Some(component.extract_props().await?), None),
            Previewable::Story(story) => {
                let args = story.extract_args().await?;
                let props = match story.associated_component() {
                    Some(component) => Some(component.extract_props().await?),
                    None => None,
                };
                (props, args)
            }
        };

        let synthesized = props.as_ref().map(|props| props.example(policy));
        let example = match (synthesized, &args) {
            (Some(base), Some(args)) => base.merged_with(args.value.clone()),
            (Some(base), None) => base,
            (None, Some(args)) => args.value.clone(),
            (None, None) => SerializableValue::empty_object(),
        };

        Ok(PropsReport {
            id: previewable.id().to_string(),
            assignment: generate_props_assignment(&example),
            props,
            args,
            example,
        })
    }
}

/// Human-readable rendering of crawl and props results.
pub struct Reporter {
    color: bool,
    /// Sources read for line/column locations; `None` when unreadable.
    sources: HashMap<PathBuf, Option<(String, LineMap)>>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: HashMap::new(),
        }
    }

    /// `line:column` (1-based) of the start of `span` in `path`.
    fn location(&mut self, path: &Path, span: ByteSpan) -> Option<String> {
        let entry = self.sources.entry(path.to_path_buf()).or_insert_with(|| {
            std::fs::read_to_string(path).ok().map(|text| {
                let map = LineMap::build(&text);
                (text, map)
            })
        });
        let (text, map) = entry.as_ref()?;
        let position = map.offset_to_position(span.start, text);
        Some(format!("{}:{}", position.line + 1, position.character + 1))
    }

    fn push_location(&mut self, out: &mut String, path: &Path, span: ByteSpan) {
        if let Some(location) = self.location(path, span) {
            out.push_str(&self.paint(&format!(" ({location})"), |s| s.dimmed()));
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn render_set(&mut self, set: &PreviewableSet) -> String {
        // Files may have changed since the last render.
        self.sources.clear();
        let mut out = String::new();
        for component in &set.components {
            let label = self.paint("component", |s| s.green().bold());
            out.push_str(&format!("{label} {}", component.id()));
            self.push_location(&mut out, component.path(), component.source_position());
            if !component.exported() {
                out.push_str(&self.paint(" (local)", |s| s.dimmed()));
            }
            out.push('\n');
        }
        for story in &set.stories {
            let label = self.paint("story", |s| s.cyan().bold());
            out.push_str(&format!("{label}     {}", story.id()));
            self.push_location(&mut out, story.path(), story.source_position());
            if let StoryDeclaration::BoundTemplate {
                template: Some(template),
            } = story.declaration()
            {
                out.push_str(&self.paint(&format!(" [{template}.bind]"), |s| s.dimmed()));
            }
            if let Some(component) = story.associated_component() {
                out.push_str(&format!(" -> {}", component.id()));
            }
            out.push('\n');
        }
        let summary = format!(
            "{} components, {} stories",
            set.components.len(),
            set.stories.len()
        );
        out.push_str(&self.paint(&summary, |s| s.dimmed()));
        out.push('\n');
        out
    }

    pub fn render_props(&self, report: &PropsReport) -> String {
        let mut out = String::new();
        out.push_str(&self.paint(&report.id, |s| s.bold()));
        out.push('\n');
        if let Some(props) = &report.props {
            out.push_str(&format!("  props: {}\n", props.props));
            for (name, ty) in props.types.iter() {
                out.push_str(&format!("  type {name} = {ty}\n"));
            }
            for warning in &props.warnings {
                let label = self.paint("warning", |s| s.yellow().bold());
                out.push_str(&format!("  {label}: {warning}\n"));
            }
        }
        out.push('\n');
        out.push_str(&report.assignment);
        out
    }
}

#[cfg(test)]
#[path = "../tests/report_tests.rs"]
mod report_tests;

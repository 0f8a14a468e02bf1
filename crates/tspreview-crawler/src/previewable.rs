//! Previewables handed to callers.
//!
//! A [`Component`] or [`Story`] is a crawl result plus a handle to the
//! workspace it came from. Nothing is resolved until a caller invokes
//! [`Component::extract_props`] or [`Story::extract_args`]; both may run
//! much later and concurrently, and queue on the workspace lock.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tspreview_common::ByteSpan;
use tspreview_synth::{SynthesisPolicy, ValueSynthesizer};
use tspreview_types::{CollectedTypes, SerializableValue, ValueType};

use crate::analyzer::{AnalyzerError, Workspace};
use crate::crawler::{ComponentInfo, StoryArgs, StoryDeclaration, StoryInfo};

/// Resolved props of a component.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentProps {
    pub props: ValueType,
    pub types: CollectedTypes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ComponentProps {
    /// A representative value for the props.
    pub fn example(&self, policy: SynthesisPolicy) -> SerializableValue {
        ValueSynthesizer::new(&self.types, policy).generate(&self.props)
    }
}

#[derive(Clone, Serialize)]
pub struct Component {
    #[serde(flatten)]
    info: ComponentInfo,
    #[serde(skip)]
    workspace: Arc<Workspace>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.info.id).finish()
    }
}

impl Component {
    pub(crate) fn new(info: ComponentInfo, workspace: Arc<Workspace>) -> Self {
        Component { info, workspace }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn source_position(&self) -> ByteSpan {
        self.info.source_position
    }

    pub fn exported(&self) -> bool {
        self.info.exported
    }

    pub fn info(&self) -> &ComponentInfo {
        &self.info
    }

    /// The file declaring the component.
    pub fn path(&self) -> &Path {
        &self.info.path
    }

    /// Resolve the component's props against the current state of its file.
    pub async fn extract_props(&self) -> Result<ComponentProps, AnalyzerError> {
        self.workspace.component_props(&self.info).await
    }

    /// Props plus a synthesized example value, using the analyzer's policy.
    pub async fn example_props(&self) -> Result<(ComponentProps, SerializableValue), AnalyzerError> {
        let props = self.extract_props().await?;
        let value = props.example(self.workspace.policy());
        Ok((props, value))
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    id: String,
    source_position: ByteSpan,
    declaration: StoryDeclaration,
    associated_component: Option<Component>,
    #[serde(skip)]
    info: StoryInfo,
    #[serde(skip)]
    workspace: Arc<Workspace>,
}

impl fmt::Debug for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Story")
            .field("id", &self.id)
            .field("associated_component", &self.associated_component)
            .finish()
    }
}

impl Story {
    pub(crate) fn new(info: StoryInfo, workspace: Arc<Workspace>) -> Self {
        Story {
            id: info.id.clone(),
            source_position: info.source_position,
            declaration: info.declaration.clone(),
            associated_component: info
                .associated_component
                .clone()
                .map(|component| Component::new(component, workspace.clone())),
            info,
            workspace,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_position(&self) -> ByteSpan {
        self.source_position
    }

    pub fn path(&self) -> &Path {
        &self.info.path
    }

    pub fn declaration(&self) -> &StoryDeclaration {
        &self.declaration
    }

    pub fn associated_component(&self) -> Option<&Component> {
        self.associated_component.as_ref()
    }

    /// The story's args (meta-level args merged under its own), or `None`
    /// when neither declares any.
    pub async fn extract_args(&self) -> Result<Option<StoryArgs>, AnalyzerError> {
        self.workspace.story_args(&self.info).await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Previewable {
    Component(Component),
    Story(Story),
}

impl Previewable {
    pub fn id(&self) -> &str {
        match self {
            Previewable::Component(component) => component.id(),
            Previewable::Story(story) => story.id(),
        }
    }

    pub fn source_position(&self) -> ByteSpan {
        match self {
            Previewable::Component(component) => component.source_position(),
            Previewable::Story(story) => story.source_position(),
        }
    }
}

/// Everything found by one crawl.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PreviewableSet {
    pub components: Vec<Component>,
    pub stories: Vec<Story>,
}

impl PreviewableSet {
    pub fn len(&self) -> usize {
        self.components.len() + self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.stories.is_empty()
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.id() == id)
    }

    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|story| story.id() == id)
    }

    /// Look a previewable up by id, components first.
    pub fn find(&self, id: &str) -> Option<Previewable> {
        self.component(id)
            .cloned()
            .map(Previewable::Component)
            .or_else(|| self.story(id).cloned().map(Previewable::Story))
    }

    pub fn iter(&self) -> impl Iterator<Item = Previewable> + '_ {
        self.components
            .iter()
            .cloned()
            .map(Previewable::Component)
            .chain(self.stories.iter().cloned().map(Previewable::Story))
    }
}

//! Previewable discovery.
//!
//! [`PreviewableCrawler`] makes a single pass over the top-level statements
//! of a file and classifies declarations as components or stories. It never
//! resolves types: props and story args are extracted later, on demand.
//!
//! Stories come in two conventions, both modelled by [`StoryDeclaration`]:
//!
//! ```typescript
//! // Bound template: a function (or `Template.bind({})`) with static args.
//! export const Primary = Template.bind({});
//! Primary.args = { label: "Hi" };
//!
//! // Object story: plain objects next to a default-exported meta object.
//! export default { component: Button, args: { size: "md" } };
//! export const Large = { args: { size: "lg" } };
//! ```
//!
//! A story's associated component is the meta object's `component` binding.
//! When it is imported, the declaring file is crawled as well (bounded by
//! [`MAX_CRAWL_DEPTH`] and guarded against import cycles).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, trace};
use tspreview_checker::oracle::{resolve_entity, resolve_identifier};
use tspreview_checker::reader::{normalize_path, relative_display_path};
use tspreview_checker::{BoundFile, ModuleExtension, ScopeId, TypeOracle};
use tspreview_common::ByteSpan;
use tspreview_common::limits::MAX_CRAWL_DEPTH;
use tspreview_syntax::ast::{
    ArrayElement, ClassDecl, ClassMemberKind, Declaration, ExportDefault, ExprKind, Expression,
    Function, ObjectProperty, Statement, StatementKind,
};
use tspreview_synth::parse_serializable_value;
use tspreview_types::SerializableValue;

/// Wrapper calls whose result is a component.
const COMPONENT_WRAPPERS: &[&str] = &["forwardRef", "memo", "observer"];

/// Base classes of class components.
const COMPONENT_BASES: &[&str] = &["Component", "PureComponent"];

/// Components take a props parameter and at most a ref or context.
const MAX_COMPONENT_PARAMS: usize = 2;

/// Crawl results by normalized path.
pub type CrawlCache = FxHashMap<PathBuf, Arc<FileCrawl>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// A function or class in a script file.
    Script,
    /// A `.vue` single-file component.
    Vue,
    /// A `.svelte` component.
    Svelte,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub id: String,
    pub source_position: ByteSpan,
    pub exported: bool,
    pub kind: ComponentKind,
    #[serde(skip)]
    pub path: PathBuf,
    /// Name props extraction looks the component up by: the exported name,
    /// or the local name of an unexported component.
    #[serde(skip)]
    pub lookup_name: String,
    #[serde(skip)]
    local_name: String,
}

/// The two story conventions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "convention", rename_all = "kebab-case")]
pub enum StoryDeclaration {
    /// A function or `Template.bind({})` result carrying `X.args = {...}`.
    BoundTemplate {
        #[serde(skip_serializing_if = "Option::is_none")]
        template: Option<String>,
    },
    /// An object literal `{ args: {...} }` in a file with story metadata.
    ObjectStory,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryArgs {
    pub source_position: ByteSpan,
    pub value: SerializableValue,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryInfo {
    pub id: String,
    pub source_position: ByteSpan,
    pub declaration: StoryDeclaration,
    pub associated_component: Option<ComponentInfo>,
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(skip)]
    pub args: Option<StoryArgs>,
}

/// What one file contributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileCrawl {
    pub path: PathBuf,
    pub components: Vec<ComponentInfo>,
    pub stories: Vec<StoryInfo>,
    /// Every component-shaped declaration, including the ones classified as
    /// stories, for linking stories in other files.
    linkable: Vec<ComponentInfo>,
}

impl FileCrawl {
    fn empty(path: PathBuf) -> Self {
        FileCrawl {
            path,
            ..FileCrawl::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.stories.is_empty()
    }

    pub fn component(&self, id: &str) -> Option<&ComponentInfo> {
        self.linkable.iter().find(|component| component.id == id)
    }

    pub fn story(&self, id: &str) -> Option<&StoryInfo> {
        self.stories.iter().find(|story| story.id == id)
    }

    fn linkable_by_local_name(&self, name: &str) -> Option<&ComponentInfo> {
        self.linkable.iter().find(|component| component.local_name == name)
    }
}

pub struct PreviewableCrawler<'a> {
    oracle: &'a dyn TypeOracle,
    cache: &'a mut CrawlCache,
    visiting: FxHashSet<PathBuf>,
    crawled: Vec<PathBuf>,
}

impl<'a> PreviewableCrawler<'a> {
    pub fn new(oracle: &'a dyn TypeOracle, cache: &'a mut CrawlCache) -> Self {
        PreviewableCrawler {
            oracle,
            cache,
            visiting: FxHashSet::default(),
            crawled: Vec::new(),
        }
    }

    /// Files crawled (not served from the cache) so far, in completion order.
    pub fn crawled_paths(&self) -> &[PathBuf] {
        &self.crawled
    }

    /// Crawl `path`, reusing cached results.
    pub fn crawl(&mut self, path: &Path) -> Arc<FileCrawl> {
        let path = normalize_path(path);
        if let Some(cached) = self.cache.get(&path) {
            return cached.clone();
        }
        if self.visiting.len() as u32 >= MAX_CRAWL_DEPTH || !self.visiting.insert(path.clone()) {
            trace!(path = %path.display(), "crawl cycle or depth limit");
            return Arc::new(FileCrawl::empty(path));
        }
        let crawl = Arc::new(self.crawl_uncached(&path));
        self.visiting.remove(&path);
        self.cache.insert(path.clone(), crawl.clone());
        self.crawled.push(path);
        crawl
    }

    fn crawl_uncached(&mut self, path: &Path) -> FileCrawl {
        let Some(file) = self.oracle.source_file(path) else {
            debug!(path = %path.display(), "unreadable file contributes no previewables");
            return FileCrawl::empty(path.to_path_buf());
        };
        let relative = relative_display_path(self.oracle.root_dir(), path);
        let crawl = match ModuleExtension::from_path(path) {
            ModuleExtension::Vue => single_file_component(&file, relative, ComponentKind::Vue),
            ModuleExtension::Svelte => {
                single_file_component(&file, relative, ComponentKind::Svelte)
            }
            _ => self.crawl_script(&file, relative),
        };
        debug!(
            path = %path.display(),
            components = crawl.components.len(),
            stories = crawl.stories.len(),
            "crawled file"
        );
        crawl
    }

    fn crawl_script(&mut self, file: &Arc<BoundFile>, relative: String) -> FileCrawl {
        let scan = FileScan::new(file);
        let offset = file.text_offset;
        let text: &str = &file.source.text;
        let id_of = |name: &str| format!("{relative}:{name}");

        let mut crawl = FileCrawl::empty(file.path.clone());
        let mut story_candidates = Vec::new();

        for candidate in &scan.candidates {
            let exported_name = scan.exported_name(&candidate.local);
            let name = exported_name.unwrap_or(candidate.local.as_str());
            let is_component = candidate.is_component_shaped()
                && (is_pascal_case(name)
                    || is_pascal_case(&candidate.local)
                    || candidate.local == "default");
            if is_component {
                crawl.linkable.push(ComponentInfo {
                    id: id_of(name),
                    source_position: candidate.span.shifted(offset),
                    exported: exported_name.is_some(),
                    kind: ComponentKind::Script,
                    path: file.path.clone(),
                    lookup_name: name.to_string(),
                    local_name: candidate.local.clone(),
                });
            }
            let story = exported_name
                .filter(|name| *name != "default")
                .and_then(|name| scan.recognize_story(candidate, name));
            match story {
                Some(declaration) => story_candidates.push((candidate, name, declaration)),
                None if is_component => {
                    if let Some(component) = crawl.linkable.last() {
                        crawl.components.push(component.clone());
                    }
                }
                None => {}
            }
        }

        let meta_component = scan
            .meta
            .as_ref()
            .and_then(|meta| meta.component)
            .and_then(|component| self.link_component(file, &crawl, component));
        let meta_args = scan
            .meta
            .as_ref()
            .and_then(|meta| meta.args)
            .map(|args| (args.span, parse_serializable_value(args, text)));

        for (candidate, name, declaration) in story_candidates {
            let own_args = scan
                .story_args(candidate, &declaration)
                .map(|args| (args.span, parse_serializable_value(args, text)));
            let args = match (&meta_args, own_args) {
                (Some((_, base)), Some((span, value))) => Some((span, base.clone().merged_with(value))),
                (None, Some(own)) => Some(own),
                (Some(meta), None) => Some(meta.clone()),
                (None, None) => None,
            };
            // Without metadata, a bound function previews itself.
            let associated_component = if scan.meta.is_some() {
                meta_component.clone()
            } else {
                crawl.linkable_by_local_name(&candidate.local).cloned()
            };
            crawl.stories.push(StoryInfo {
                id: id_of(name),
                source_position: candidate.span.shifted(offset),
                declaration,
                associated_component,
                path: file.path.clone(),
                args: args.map(|(span, value)| StoryArgs {
                    source_position: span.shifted(offset),
                    value,
                }),
            });
        }
        crawl
    }

    /// The component a meta `component` field names, crawling its file when
    /// it is declared elsewhere.
    fn link_component(
        &mut self,
        file: &Arc<BoundFile>,
        current: &FileCrawl,
        expr: &Expression,
    ) -> Option<ComponentInfo> {
        let entity = expr.skip_outer().entity_text()?;
        let segments: Vec<&str> = entity.split('.').collect();
        let resolution = match segments.as_slice() {
            [name] => resolve_identifier(self.oracle, file, ScopeId::ROOT, name),
            _ => resolve_entity(self.oracle, file, ScopeId::ROOT, &segments),
        }?;
        let symbol = resolution.symbol()?;
        if symbol.file.path == file.path {
            return current.linkable_by_local_name(&symbol.name).cloned();
        }
        let target = self.crawl(&symbol.file.path);
        let found = target.linkable_by_local_name(&symbol.name).cloned();
        if found.is_none() {
            trace!(component = %entity, "story component is not component-shaped");
        }
        found
    }
}

/// `.vue` and `.svelte` files are one default-exported component each.
fn single_file_component(file: &BoundFile, relative: String, kind: ComponentKind) -> FileCrawl {
    let len = u32::try_from(file.source.text.len()).unwrap_or(u32::MAX);
    let component = ComponentInfo {
        id: format!("{relative}:default"),
        source_position: ByteSpan::new(0, len).shifted(file.text_offset),
        exported: true,
        kind,
        path: file.path.clone(),
        lookup_name: "default".to_string(),
        local_name: "default".to_string(),
    };
    FileCrawl {
        path: file.path.clone(),
        components: vec![component.clone()],
        stories: Vec::new(),
        linkable: vec![component],
    }
}

fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// A top-level declaration that may be a component or a story.
struct Candidate<'a> {
    local: String,
    span: ByteSpan,
    value: CandidateValue<'a>,
}

enum CandidateValue<'a> {
    Function(&'a Function),
    Class(&'a ClassDecl),
    /// `memo(...)`, `forwardRef(...)`.
    Wrapped,
    /// `Template.bind({})`.
    Bind { template: String },
    Object(&'a [ObjectProperty]),
}

impl Candidate<'_> {
    fn is_component_shaped(&self) -> bool {
        match &self.value {
            CandidateValue::Function(function) => function.params.len() <= MAX_COMPONENT_PARAMS,
            CandidateValue::Class(class) => is_component_class(class),
            CandidateValue::Wrapped => true,
            CandidateValue::Bind { .. } | CandidateValue::Object(_) => false,
        }
    }

    fn is_function(&self) -> bool {
        matches!(
            self.value,
            CandidateValue::Function(_) | CandidateValue::Wrapped | CandidateValue::Bind { .. }
        )
    }
}

fn is_component_class(class: &ClassDecl) -> bool {
    let extends_component = class.extends.as_ref().is_some_and(|heritage| {
        heritage
            .expression
            .entity_text()
            .is_some_and(|base| COMPONENT_BASES.contains(&base.rsplit('.').next().unwrap_or_default()))
    });
    extends_component
        || class.members.iter().any(|member| {
            matches!(&member.kind, ClassMemberKind::Method { name, .. } if name.as_text().as_deref() == Some("render"))
        })
}

/// The default-exported story metadata.
struct Meta<'a> {
    component: Option<&'a Expression>,
    args: Option<&'a Expression>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl<'a> Meta<'a> {
    /// `{ component, title, args, includeStories, excludeStories }`; objects
    /// without `component` or `title` are not story metadata.
    fn from_object(properties: &'a [ObjectProperty]) -> Option<Self> {
        let component = object_field(properties, "component");
        if component.is_none() && object_field(properties, "title").is_none() {
            return None;
        }
        Some(Meta {
            component,
            args: object_field(properties, "args"),
            include: object_field(properties, "includeStories").map(string_list),
            exclude: object_field(properties, "excludeStories").map(string_list),
        })
    }

    fn admits(&self, export_name: &str) -> bool {
        let included = self
            .include
            .as_ref()
            .is_none_or(|names| names.iter().any(|name| name == export_name));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|names| names.iter().any(|name| name == export_name));
        included && !excluded
    }
}

fn object_field<'a>(properties: &'a [ObjectProperty], name: &str) -> Option<&'a Expression> {
    properties.iter().rev().find_map(|property| match property {
        ObjectProperty::KeyValue { key, value } if key.as_text().as_deref() == Some(name) => {
            Some(value)
        }
        _ => None,
    })
}

/// `["A", "B"]` or a single `"A"`; other elements are ignored.
fn string_list(expr: &Expression) -> Vec<String> {
    match &expr.skip_outer().kind {
        ExprKind::String(value) | ExprKind::NoSubstitutionTemplate(value) => vec![value.clone()],
        ExprKind::Array(elements) => elements
            .iter()
            .filter_map(|element| match element {
                ArrayElement::Expr(item) => match &item.skip_outer().kind {
                    ExprKind::String(value) | ExprKind::NoSubstitutionTemplate(value) => {
                        Some(value.clone())
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Facts gathered from one pass over a file's top-level statements.
struct FileScan<'a> {
    candidates: Vec<Candidate<'a>>,
    /// Local name to the names it is exported under, in source order.
    exports: FxHashMap<String, Vec<String>>,
    /// `X.args = value` / `X.previews = value`; the last assignment wins.
    args_assignments: IndexMap<String, &'a Expression>,
    meta: Option<Meta<'a>>,
}

impl<'a> FileScan<'a> {
    fn new(file: &'a BoundFile) -> Self {
        let mut scan = FileScan {
            candidates: Vec::new(),
            exports: FxHashMap::default(),
            args_assignments: IndexMap::new(),
            meta: None,
        };
        let mut objects: FxHashMap<&'a str, &'a [ObjectProperty]> = FxHashMap::default();
        let mut default_expression = None;

        for statement in &file.source.statements {
            match &statement.kind {
                StatementKind::Declaration {
                    exported,
                    declare: false,
                    decl,
                } => scan.declaration(statement, decl, *exported, &mut objects),
                StatementKind::ExportNamed(named) if named.source.is_none() && !named.type_only => {
                    for specifier in named.specifiers.iter().filter(|s| !s.type_only) {
                        scan.export(&specifier.local.name, &specifier.exported.name);
                    }
                }
                StatementKind::ExportDefault(ExportDefault::Declaration(decl)) => {
                    let local = match decl {
                        Declaration::Function(function) => function.name.as_ref(),
                        Declaration::Class(class) => class.name.as_ref(),
                        _ => continue,
                    }
                    .map_or("default", |ident| ident.name.as_str());
                    scan.declaration_named(statement.span, decl, local);
                    scan.export(local, "default");
                }
                StatementKind::ExportDefault(ExportDefault::Expression(expr)) => {
                    default_expression = Some((statement.span, expr));
                }
                StatementKind::Expression(expr) => scan.args_assignment(expr),
                _ => {}
            }
        }

        if let Some((span, expr)) = default_expression {
            let expr = expr.skip_outer();
            match &expr.kind {
                ExprKind::Identifier(name) => {
                    scan.export(name, "default");
                    if let Some(properties) = objects.get(name.as_str()) {
                        scan.meta = Meta::from_object(properties);
                    }
                }
                ExprKind::Object(properties) => scan.meta = Meta::from_object(properties),
                _ => {
                    if let Some(value) = candidate_value(expr) {
                        scan.candidates.push(Candidate {
                            local: "default".to_string(),
                            span,
                            value,
                        });
                        scan.export("default", "default");
                    }
                }
            }
        }
        scan
    }

    fn declaration(
        &mut self,
        statement: &'a Statement,
        decl: &'a Declaration,
        exported: bool,
        objects: &mut FxHashMap<&'a str, &'a [ObjectProperty]>,
    ) {
        match decl {
            Declaration::Function(function) => {
                let Some(name) = &function.name else {
                    return;
                };
                self.declaration_named(statement.span, decl, &name.name);
                if exported {
                    self.export(&name.name, &name.name);
                }
            }
            Declaration::Class(class) => {
                let Some(name) = &class.name else {
                    return;
                };
                self.declaration_named(statement.span, decl, &name.name);
                if exported {
                    self.export(&name.name, &name.name);
                }
            }
            Declaration::Variable(vars) => {
                for declarator in &vars.declarations {
                    let Some(ident) = declarator.name.as_identifier() else {
                        continue;
                    };
                    let Some(init) = &declarator.init else {
                        continue;
                    };
                    if exported {
                        self.export(&ident.name, &ident.name);
                    }
                    if let ExprKind::Object(properties) = &init.skip_outer().kind {
                        objects.insert(&ident.name, properties);
                    }
                    if let Some(value) = candidate_value(init) {
                        self.candidates.push(Candidate {
                            local: ident.name.clone(),
                            span: declarator.span,
                            value,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    fn declaration_named(&mut self, span: ByteSpan, decl: &'a Declaration, local: &str) {
        let value = match decl {
            Declaration::Function(function) if function.body.is_some() => {
                CandidateValue::Function(function)
            }
            Declaration::Class(class) => CandidateValue::Class(class),
            _ => return,
        };
        self.candidates.push(Candidate {
            local: local.to_string(),
            span,
            value,
        });
    }

    fn export(&mut self, local: &str, exported: &str) {
        let names = self.exports.entry(local.to_string()).or_default();
        if !names.iter().any(|name| name == exported) {
            names.push(exported.to_string());
        }
    }

    /// The name a local is known by outside the file: its first named
    /// export, else `default`.
    fn exported_name(&self, local: &str) -> Option<&str> {
        let names = self.exports.get(local)?;
        names
            .iter()
            .find(|name| *name != "default")
            .or_else(|| names.first())
            .map(String::as_str)
    }

    fn args_assignment(&mut self, expr: &'a Expression) {
        let ExprKind::Assign { op, target, value } = &expr.kind else {
            return;
        };
        if op != "=" {
            return;
        }
        if let ExprKind::Member {
            object, property, ..
        } = &target.skip_outer().kind
            && matches!(property.name.as_str(), "args" | "previews")
            && let Some(name) = object.as_identifier()
        {
            self.args_assignments.insert(name.to_string(), value);
        }
    }

    /// Classify an exported candidate as a story.
    fn recognize_story(&self, candidate: &Candidate<'a>, export_name: &str) -> Option<StoryDeclaration> {
        if let Some(meta) = &self.meta
            && !meta.admits(export_name)
        {
            return None;
        }
        let has_args = self.args_assignments.contains_key(&candidate.local);
        let has_meta = self.meta.is_some();
        match &candidate.value {
            CandidateValue::Bind { template } if has_args || has_meta => {
                Some(StoryDeclaration::BoundTemplate {
                    template: Some(template.clone()),
                })
            }
            CandidateValue::Object(_) if has_meta => Some(StoryDeclaration::ObjectStory),
            _ if candidate.is_function() && (has_args || has_meta) => {
                Some(StoryDeclaration::BoundTemplate { template: None })
            }
            _ => None,
        }
    }

    /// The args expression of a story: its static assignment, or the `args`
    /// field of an object story.
    fn story_args(&self, candidate: &Candidate<'a>, declaration: &StoryDeclaration) -> Option<&'a Expression> {
        match (declaration, &candidate.value) {
            (StoryDeclaration::ObjectStory, CandidateValue::Object(properties)) => {
                object_field(properties, "args")
            }
            _ => self.args_assignments.get(&candidate.local).copied(),
        }
    }
}

/// Shape of a declaration's initializer, when it can be a previewable.
fn candidate_value(init: &Expression) -> Option<CandidateValue<'_>> {
    match &init.skip_outer().kind {
        ExprKind::Arrow(function) | ExprKind::Function(function) => {
            Some(CandidateValue::Function(function))
        }
        ExprKind::Class(class) => Some(CandidateValue::Class(class)),
        ExprKind::Object(properties) => Some(CandidateValue::Object(properties)),
        ExprKind::Call { callee, .. } => {
            let callee = callee.skip_outer();
            if let ExprKind::Member {
                object, property, ..
            } = &callee.kind
                && property.name == "bind"
            {
                return object.entity_text().map(|template| CandidateValue::Bind { template });
            }
            let name = callee.entity_text()?;
            let wrapper = name.rsplit('.').next().unwrap_or_default();
            COMPONENT_WRAPPERS
                .contains(&wrapper)
                .then_some(CandidateValue::Wrapped)
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/crawler_tests.rs"]
mod crawler_tests;

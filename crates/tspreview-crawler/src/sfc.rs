//! Script blocks of single-file components.
//!
//! `.vue` and `.svelte` files are markup with embedded `<script>` elements.
//! Only one block is analyzed per file:
//!
//! - Vue: `<script setup>` when present, else the plain `<script>` block
//! - Svelte: the instance script, else the module script
//!
//! The block keeps its byte offset so that positions reported for the file
//! point into the original markup.

use std::path::Path;

use memchr::memmem;
use tspreview_checker::{EmbeddedScript, ModuleExtension, ScriptExtractor};

#[derive(Clone, Copy, Debug, Default)]
pub struct SfcScriptExtractor;

impl ScriptExtractor for SfcScriptExtractor {
    fn extract(&self, path: &Path, text: &str) -> Option<EmbeddedScript> {
        let blocks = script_blocks(text);
        let chosen = match ModuleExtension::from_path(path) {
            ModuleExtension::Vue => blocks
                .iter()
                .find(|block| block.has_attribute("setup"))
                .or_else(|| blocks.first()),
            ModuleExtension::Svelte => blocks
                .iter()
                .find(|block| !block.is_svelte_module())
                .or_else(|| blocks.first()),
            _ => None,
        }?;
        Some(EmbeddedScript {
            text: text[chosen.content_start..chosen.content_end].to_string(),
            offset: u32::try_from(chosen.content_start).ok()?,
        })
    }
}

#[derive(Debug)]
struct ScriptBlock<'a> {
    /// Attribute text of the opening tag.
    attributes: &'a str,
    content_start: usize,
    content_end: usize,
}

impl ScriptBlock<'_> {
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .split(|c: char| c.is_ascii_whitespace())
            .any(|attr| attr == name || attr.split('=').next() == Some(name))
    }

    fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .split(|c: char| c.is_ascii_whitespace())
            .find_map(|attr| {
                let (key, value) = attr.split_once('=')?;
                (key == name).then(|| value.trim_matches(|c| c == '"' || c == '\''))
            })
    }

    /// `<script context="module">` (Svelte 4) or `<script module>` (Svelte 5).
    fn is_svelte_module(&self) -> bool {
        self.attribute_value("context") == Some("module") || self.has_attribute("module")
    }
}

/// Top-level `<script>` elements in document order. Unterminated blocks run
/// to the end of the text.
fn script_blocks(text: &str) -> Vec<ScriptBlock<'_>> {
    let bytes = text.as_bytes();
    let open = memmem::Finder::new(b"<script");
    let close = memmem::Finder::new(b"</script");
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(found) = open.find(&bytes[pos..]) {
        let tag_start = pos + found;
        let name_end = tag_start + "<script".len();
        // `<scripts>` or `<script-foo>` are other elements.
        if bytes
            .get(name_end)
            .is_some_and(|b| !(b.is_ascii_whitespace() || *b == b'>' || *b == b'/'))
        {
            pos = name_end;
            continue;
        }
        let Some(tag_len) = memchr::memchr(b'>', &bytes[name_end..]) else {
            break;
        };
        let tag_end = name_end + tag_len;
        let attributes = text[name_end..tag_end].trim().trim_end_matches('/');
        let content_start = tag_end + 1;
        if bytes[tag_end.saturating_sub(1)] == b'/' {
            pos = content_start;
            continue;
        }
        let content_end = close
            .find(&bytes[content_start..])
            .map_or(bytes.len(), |len| content_start + len);
        blocks.push(ScriptBlock {
            attributes,
            content_start,
            content_end,
        });
        pos = content_end;
    }
    blocks
}

#[cfg(test)]
#[path = "../tests/sfc_tests.rs"]
mod sfc_tests;

//! Link extractor
//!
//! Walks a résumé JSON tree and reports every `{ "url": { "href": .. } }` node
//! whose href is an absolute http(s) URL. Extraction is read-only; the document
//! is only touched when the caller applies a [`RewriteTarget`].

use serde_json::Value;
use tracing::warn;

use crate::utils::is_web_url;

pub const MAX_LABEL_CHARS: usize = 200;
/// 与 tracer_links.source_path 列宽一致，超出的链接保持原样
pub const MAX_SOURCE_PATH_LEN: usize = 255;
const DEFAULT_LABEL: &str = "Resume Link";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// One rewritable hyperlink inside the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTarget {
    /// e.g. `sections.projects.items[0].url.href`
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    /// path from the root to the `url` object
    node: Vec<Segment>,
    original_label: Option<String>,
}

impl RewriteTarget {
    /// Point the link at `tracer_url`.
    ///
    /// The label is replaced too, but only when it was empty or just repeated
    /// the original href. Returns `false` if the node is no longer there.
    pub fn apply(&self, document: &mut Value, tracer_url: &str) -> bool {
        let Some(Value::Object(link)) = resolve_mut(document, &self.node) else {
            return false;
        };

        let replace_label = match self.original_label.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(label) => label == self.destination_url,
        };

        link.insert("href".to_string(), Value::String(tracer_url.to_string()));
        if replace_label {
            link.insert("label".to_string(), Value::String(tracer_url.to_string()));
        }
        true
    }
}

/// Collect every web link in document order
pub fn extract_targets(document: &Value) -> Vec<RewriteTarget> {
    let mut targets = Vec::new();
    let mut path = Vec::new();
    walk(document, &mut path, &mut targets);
    targets
}

fn walk(value: &Value, path: &mut Vec<Segment>, out: &mut Vec<RewriteTarget>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(link)) = map.get("url")
                && let Some(Value::String(href)) = link.get("href")
                && is_web_url(href)
            {
                path.push(Segment::Key("url".to_string()));
                let target = build_target(path, href, link.get("label"));
                path.pop();
                if target.source_path.len() <= MAX_SOURCE_PATH_LEN {
                    out.push(target);
                } else {
                    warn!(
                        "Skipping link with {}-byte source path (max {})",
                        target.source_path.len(),
                        MAX_SOURCE_PATH_LEN
                    );
                }
            }

            for (key, child) in map {
                path.push(Segment::Key(key.clone()));
                walk(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(Segment::Index(index));
                walk(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn build_target(node: &[Segment], href: &str, label: Option<&Value>) -> RewriteTarget {
    let original_label = label.and_then(Value::as_str).map(str::to_string);

    let source_label = match original_label.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.chars().take(MAX_LABEL_CHARS).collect(),
        _ => derive_label(node),
    };

    RewriteTarget {
        source_path: format!("{}.href", format_path(node)),
        source_label,
        destination_url: href.trim().to_string(),
        node: node.to_vec(),
        original_label,
    }
}

fn format_path(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// Label from the node position when the link has none
fn derive_label(node: &[Segment]) -> String {
    use Segment::{Index, Key};

    match node {
        [Key(root), Key(url)] if root == "basics" && url == "url" => "Portfolio".to_string(),
        [Key(root), Key(section), rest @ ..] if root == "sections" => {
            let Some(category) = section_category(section) else {
                return DEFAULT_LABEL.to_string();
            };
            match rest {
                [Key(items), Index(n), ..] if items == "items" => {
                    format!("{} Link {}", category, n + 1)
                }
                _ => format!("{} Link", category),
            }
        }
        _ => DEFAULT_LABEL.to_string(),
    }
}

fn section_category(section: &str) -> Option<&'static str> {
    Some(match section {
        "profiles" => "Profile",
        "projects" => "Project",
        "experience" => "Experience",
        "education" => "Education",
        "awards" => "Award",
        "certificates" => "Certificate",
        "publications" => "Publication",
        "volunteer" => "Volunteer",
        _ => return None,
    })
}

fn resolve_mut<'a>(root: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |node, segment| match segment {
        Segment::Key(key) => node.as_object_mut()?.get_mut(key),
        Segment::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

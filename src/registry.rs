//! Entity registry: natural key -> node identity
//!
//! The registry only holds lookup indices. Nodes themselves are owned by
//! the [`GraphStore`]; the registry creates them there on first sight of a
//! key and hands back the same id for every later occurrence.

use crate::error::ValidationError;
use crate::graph::{GraphStore, NodeId, NodeKind, PropertyMap};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// One component of a natural key, as read from a record
#[derive(Debug, Clone, Copy)]
pub struct KeyPart<'a> {
    pub field: &'a str,
    pub value: Option<&'a str>,
    pub required: bool,
}

impl<'a> KeyPart<'a> {
    /// A component that must be present and non-blank
    pub fn required(field: &'a str, value: Option<&'a str>) -> Self {
        KeyPart {
            field,
            value,
            required: true,
        }
    }

    /// A component that may be absent (normalized to the empty string)
    pub fn optional(field: &'a str, value: Option<&'a str>) -> Self {
        KeyPart {
            field,
            value,
            required: false,
        }
    }
}

/// Normalized natural key of an entity
///
/// Components are trimmed, inner whitespace runs collapsed to one space and
/// case-folded. Original casing is kept only in node attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    kind: NodeKind,
    parts: Vec<String>,
}

impl NaturalKey {
    pub fn new(kind: NodeKind, parts: &[KeyPart<'_>]) -> Result<Self, ValidationError> {
        let parts = parts
            .iter()
            .map(|part| {
                let normalized = part.value.map(normalize).unwrap_or_default();
                if part.required && normalized.is_empty() {
                    Err(ValidationError::new(kind, part.field))
                } else {
                    Ok(normalized)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NaturalKey { kind, parts })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Human-readable stable key, e.g. `brewer:hario-v60`
    pub fn slug(&self) -> String {
        let separator = match self.kind {
            NodeKind::Brewer => "-",
            _ => ":",
        };
        let body = self
            .parts
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| slugify(p))
            .collect::<Vec<_>>()
            .join(separator);
        let body = if body.is_empty() { "unknown".to_string() } else { body };
        format!("{}:{}", self.kind.slug_prefix(), body)
    }
}

/// Trim, collapse inner whitespace and case-fold
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercase alphanumerics joined by hyphens; `unknown` when nothing is left
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

/// Outcome of a registry resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: NodeId,
    pub created: bool,
}

/// Hash-indexed registry of deduplicated entities
///
/// Also hands out node slugs. Slugification is lossier than key
/// normalization, so a slug already taken by another entity gets a
/// numeric suffix (`-2`, `-3`, ...) and every node keeps a distinct slug.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    index: FxHashMap<NaturalKey, NodeId>,
    slugs: FxHashSet<String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity already registered for a key
    pub fn lookup(&self, key: &NaturalKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Reserve `base`, or the first free `base-N` when it is taken
    pub(crate) fn allocate_slug(&mut self, base: String) -> String {
        let mut slug = base.clone();
        let mut suffix = 2;
        while self.slugs.contains(&slug) {
            slug = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        self.slugs.insert(slug.clone());
        slug
    }

    /// Resolve a key tuple to a node, creating the node on first sight.
    ///
    /// Fails with [`ValidationError`] when a required component is blank.
    /// An existing node keeps its attributes; `attrs` is used only on
    /// creation.
    pub(crate) fn resolve_or_create(
        &mut self,
        store: &mut GraphStore,
        kind: NodeKind,
        parts: &[KeyPart<'_>],
        attrs: PropertyMap,
    ) -> Result<Resolved, ValidationError> {
        let key = NaturalKey::new(kind, parts)?;
        Ok(self.resolve_key(store, key, attrs))
    }

    /// Same as [`resolve_or_create`](Self::resolve_or_create) for a key
    /// that has already been validated.
    pub(crate) fn resolve_key(
        &mut self,
        store: &mut GraphStore,
        key: NaturalKey,
        attrs: PropertyMap,
    ) -> Resolved {
        if let Some(id) = self.lookup(&key) {
            return Resolved { id, created: false };
        }
        let slug = self.allocate_slug(key.slug());
        let id = store.create_node(key.kind(), slug.as_str(), attrs);
        debug!("Created {} node {} ({})", key.kind(), id, slug);
        self.index.insert(key, id);
        Resolved { id, created: true }
    }
}

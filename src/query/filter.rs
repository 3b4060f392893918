//! Attribute predicates over nodes
//!
//! A filter is anything implementing [`NodePredicate`]: plain closures, or
//! the composable [`Predicate`] tree (the WHERE clause of this engine).

use super::QueryEngine;
use crate::graph::{Node, NodeKind, PropertyValue};
use std::cmp::Ordering;

/// Decides whether a node is kept by a filter
pub trait NodePredicate {
    fn matches(&self, node: &Node) -> bool;
}

impl<F> NodePredicate for F
where
    F: Fn(&Node) -> bool,
{
    fn matches(&self, node: &Node) -> bool {
        self(node)
    }
}

/// Comparison tree over node attributes
///
/// Comparisons against a missing attribute or a value of an incomparable
/// type never match.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, PropertyValue),
    Lt(String, PropertyValue),
    Le(String, PropertyValue),
    Gt(String, PropertyValue),
    Ge(String, PropertyValue),
    /// Inclusive range
    Between(String, PropertyValue, PropertyValue),
    /// Case-insensitive substring of a string attribute
    Contains(String, String),
    Exists(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn eq(attr: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Predicate::Eq(attr.into(), value.into())
    }

    pub fn lt(attr: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Predicate::Lt(attr.into(), value.into())
    }

    pub fn le(attr: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Predicate::Le(attr.into(), value.into())
    }

    pub fn gt(attr: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Predicate::Gt(attr.into(), value.into())
    }

    pub fn ge(attr: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Predicate::Ge(attr.into(), value.into())
    }

    pub fn between(
        attr: impl Into<String>,
        low: impl Into<PropertyValue>,
        high: impl Into<PropertyValue>,
    ) -> Self {
        Predicate::Between(attr.into(), low.into(), high.into())
    }

    pub fn contains(attr: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Contains(attr.into(), needle.into())
    }

    pub fn exists(attr: impl Into<String>) -> Self {
        Predicate::Exists(attr.into())
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut all) => {
                all.push(other);
                Predicate::And(all)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut any) => {
                any.push(other);
                Predicate::Or(any)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    fn compare(node: &Node, attr: &str, value: &PropertyValue) -> Option<Ordering> {
        node.get_property(attr)?.compare(value)
    }
}

impl NodePredicate for Predicate {
    fn matches(&self, node: &Node) -> bool {
        match self {
            Predicate::Eq(attr, v) => Self::compare(node, attr, v) == Some(Ordering::Equal),
            Predicate::Lt(attr, v) => Self::compare(node, attr, v) == Some(Ordering::Less),
            Predicate::Le(attr, v) => matches!(
                Self::compare(node, attr, v),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::Gt(attr, v) => Self::compare(node, attr, v) == Some(Ordering::Greater),
            Predicate::Ge(attr, v) => matches!(
                Self::compare(node, attr, v),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Between(attr, low, high) => {
                Predicate::Ge(attr.clone(), low.clone()).matches(node)
                    && Predicate::Le(attr.clone(), high.clone()).matches(node)
            }
            Predicate::Contains(attr, needle) => node
                .get_str(attr)
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::Exists(attr) => node.has_property(attr),
            Predicate::And(all) => all.iter().all(|p| p.matches(node)),
            Predicate::Or(any) => any.iter().any(|p| p.matches(node)),
            Predicate::Not(inner) => !inner.matches(node),
        }
    }
}

impl<'g> QueryEngine<'g> {
    /// Lazily yield nodes of `kind` accepted by `predicate`.
    ///
    /// The iterator scans the kind index on every call, so calling again
    /// restarts the scan.
    pub fn filter_nodes<P>(&self, kind: NodeKind, predicate: P) -> impl Iterator<Item = &'g Node> + 'g
    where
        P: NodePredicate + 'g,
    {
        self.store
            .nodes_of_kind(kind)
            .filter(move |node| predicate.matches(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, PropertyMap};

    fn node(props: &[(&str, PropertyValue)]) -> Node {
        let properties: PropertyMap = props
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Node::new(NodeId::new(0), NodeKind::BrewSession, "brew:b1", properties)
    }

    #[test]
    fn test_comparisons() {
        let n = node(&[("dose_g", 15.0.into()), ("barista", "Sam".into())]);

        assert!(Predicate::eq("dose_g", 15).matches(&n));
        assert!(Predicate::eq("barista", "sam").matches(&n));
        assert!(Predicate::lt("dose_g", 16.5).matches(&n));
        assert!(Predicate::le("dose_g", 15).matches(&n));
        assert!(!Predicate::gt("dose_g", 15).matches(&n));
        assert!(Predicate::ge("dose_g", 15).matches(&n));
        assert!(Predicate::between("dose_g", 12, 18).matches(&n));
        assert!(!Predicate::between("dose_g", 16, 18).matches(&n));
    }

    #[test]
    fn test_missing_and_mismatched_never_match() {
        let n = node(&[("barista", "Sam".into())]);

        assert!(!Predicate::eq("dose_g", 15).matches(&n));
        assert!(!Predicate::gt("barista", 3).matches(&n));
        assert!(Predicate::gt("barista", 3).negate().matches(&n));
        assert!(!Predicate::exists("dose_g").matches(&n));
    }

    #[test]
    fn test_contains_and_combinators() {
        let n = node(&[("notes_overall", "Juicy, Bright finish".into()), ("dose_g", 18.0.into())]);

        assert!(Predicate::contains("notes_overall", "bright").matches(&n));
        assert!(!Predicate::contains("dose_g", "18").matches(&n));

        let both = Predicate::contains("notes_overall", "juicy").and(Predicate::ge("dose_g", 18));
        assert!(both.matches(&n));
        let either = Predicate::exists("bloom_sec").or(Predicate::exists("dose_g"));
        assert!(either.matches(&n));
        assert_eq!(
            Predicate::exists("a").and(Predicate::exists("b")).and(Predicate::exists("c")),
            Predicate::And(vec![
                Predicate::exists("a"),
                Predicate::exists("b"),
                Predicate::exists("c"),
            ])
        );
    }

    #[test]
    fn test_closure_predicate() {
        let n = node(&[("dose_g", 20.0.into())]);
        let heavy = |node: &Node| node.get_f64("dose_g").is_some_and(|d| d > 18.0);
        assert!(heavy.matches(&n));
    }
}

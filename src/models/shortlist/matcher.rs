//! Keyword matching between a package's requirement names and the
//! resources vendors declare.
//!
//! Each requirement name contributes its first word and its first two
//! words as keywords. A vendor matches a kind when one of its declared
//! resources of that kind contains any of the kind's keywords.

use std::collections::HashSet;

use crate::models::requirement::{ByKind, RequirementItem, RequirementKind};
use crate::models::vendor::{DeclaredResource, VendorWithResources};

pub trait MatchStrategy {
    /// Keywords for a list of requirement names, deduplicated in first-seen
    /// order.
    fn derive_keywords(&self, names: &[String]) -> Vec<String>;

    /// Whether a declared resource name satisfies any of the keywords.
    fn matches(&self, resource_name: &str, keywords: &[String]) -> bool;
}

/// Case-insensitive substring matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl MatchStrategy for SubstringMatcher {
    fn derive_keywords(&self, names: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        names
            .iter()
            .flat_map(|name| keywords_for_name(name))
            .filter(|kw| seen.insert(kw.clone()))
            .collect()
    }

    fn matches(&self, resource_name: &str, keywords: &[String]) -> bool {
        let haystack = resource_name.to_lowercase();
        keywords
            .iter()
            .any(|kw| !kw.is_empty() && haystack.contains(kw.as_str()))
    }
}

/// `"Semen Portland Tipe I"` gives `["semen", "semen portland"]`.
pub fn keywords_for_name(name: &str) -> Vec<String> {
    let lowered = name.to_lowercase();
    let mut words = lowered.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };
    match words.next() {
        Some(second) => vec![first.to_string(), format!("{first} {second}")],
        None => vec![first.to_string()],
    }
}

/// A vendor's hit for one kind, with its declared resources of that kind.
#[derive(Debug, Clone)]
pub struct VendorMatch<'a> {
    pub vendor: &'a VendorWithResources,
    pub resources: Vec<&'a DeclaredResource>,
}

/// Group matching vendors per kind, keeping vendor order. Kinds without
/// keywords match nothing.
pub fn match_vendors<'a, S: MatchStrategy + ?Sized>(
    strategy: &S,
    keywords: &ByKind<Vec<String>>,
    vendors: &'a [VendorWithResources],
) -> ByKind<Vec<VendorMatch<'a>>> {
    let mut result: ByKind<Vec<VendorMatch<'a>>> = ByKind::default();
    for kind in RequirementKind::ALL {
        let kind_keywords = keywords.get(kind);
        if kind_keywords.is_empty() {
            continue;
        }
        for vendor in vendors {
            let resources: Vec<&DeclaredResource> =
                vendor.resources.iter().filter(|r| r.kind == kind).collect();
            if resources
                .iter()
                .any(|r| strategy.matches(&r.name, kind_keywords))
            {
                result.get_mut(kind).push(VendorMatch { vendor, resources });
            }
        }
    }
    result
}

/// A vendor counts as selected for a kind when resources of that kind were
/// confirmed for it, or when it is already on the shortlist.
pub fn is_selected(kind: RequirementKind, confirmed: &ByKind<Vec<i64>>, shortlisted: bool) -> bool {
    !confirmed.get(kind).is_empty() || shortlisted
}

/// Split a free-text resource declaration on `;` and `,` into lowercase
/// tokens, without blanks or repeats.
pub fn split_resource_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split([';', ','])
        .map(|part| part.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Requirement items whose names contain any of the tokens.
pub fn items_matching_tokens(
    items: ByKind<Vec<RequirementItem>>,
    tokens: &[String],
) -> ByKind<Vec<RequirementItem>> {
    items.map(|_, list| {
        let mut seen = HashSet::new();
        list.into_iter()
            .filter(|item| {
                let name = item.name.to_lowercase();
                tokens.iter().any(|t| name.contains(t.as_str()))
            })
            .filter(|item| seen.insert(item.id))
            .collect()
    })
}

//! Folding discovered scoped registries into the project manifest.
//!
//! Candidates are folded in input order against the accumulating result:
//! a candidate whose name is already present extends that entry's scopes,
//! anything else is appended as a copy. The result depends only on input
//! order.

use serde_json::Value;

use crate::SCOPED_REGISTRIES_KEY;
use crate::document::{FieldAccess, ManifestDocument};
use crate::error::Result;
use crate::registry::RegistryEntry;

/// Fold `candidates` into `existing`, returning the merged list.
///
/// On a name collision the first-seen `url` is kept and only scopes are
/// extended.
pub fn merge_registries(existing: &[RegistryEntry], candidates: &[RegistryEntry]) -> Vec<RegistryEntry> {
    let mut merged = existing.to_vec();
    for candidate in candidates {
        match merged.iter_mut().find(|entry| entry.same_registry(candidate)) {
            Some(entry) => {
                entry.merge_scopes_from(candidate);
            }
            None => merged.push(candidate.clone()),
        }
    }
    merged
}

/// What [`apply_registries`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// The registry list as written to the document.
    pub registries: Vec<RegistryEntry>,
    /// Entries appended to the list.
    pub added: usize,
    /// Scopes appended to entries that already existed.
    pub scopes_added: usize,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.scopes_added > 0
    }
}

/// A named entry already in the project's registry list.
struct Existing {
    /// Position in the document's list.
    index: usize,
    entry: RegistryEntry,
    /// Whether new scopes can be appended without losing what is there.
    extensible: bool,
}

/// Read the identity of a project registry object.
///
/// Only `name` has to be a string. Other fields are read leniently: a
/// non-string `url` reads as empty and non-string scope items are ignored.
/// An entry whose `scopes` is present but not a list can still be matched,
/// but is never extended.
fn read_existing(index: usize, item: &Value) -> Option<Existing> {
    let Value::Object(map) = item else {
        return None;
    };
    let Ok(Some(name)) = map.get_str("name") else {
        return None;
    };

    if let Ok(entry) = RegistryEntry::from_value(item) {
        return Some(Existing {
            index,
            entry,
            extensible: true,
        });
    }

    tracing::warn!(registry = name, "Scoped registry has malformed fields, matching by name only");
    let url = map.get("url").and_then(Value::as_str).unwrap_or_default();
    let (scopes, extensible) = match map.get("scopes") {
        None | Some(Value::Null) => (Vec::new(), true),
        Some(Value::Array(items)) => (items.iter().filter_map(Value::as_str).collect(), true),
        Some(_) => (Vec::new(), false),
    };
    Some(Existing {
        index,
        entry: RegistryEntry::new(name, url, scopes),
        extensible,
    })
}

/// Append `scopes` to the `scopes` list of a registry object, creating it when absent.
fn append_scopes(item: &mut Value, scopes: &[String]) {
    let Value::Object(map) = item else {
        return;
    };
    let list = map
        .entry("scopes")
        .or_insert_with(|| Value::Array(Vec::new()));
    if list.is_null() {
        *list = Value::Array(Vec::new());
    }
    if let Value::Array(items) = list {
        items.extend(scopes.iter().cloned().map(Value::from));
    }
}

/// Merge `candidates` into the registry list of the project manifest `doc`.
///
/// The fold is [`merge_registries`] over the named entries already in the
/// list. Existing entries are updated in place: new scopes are appended to
/// their `scopes` list and nothing else is rewritten, so extra keys and
/// unreadable scope items survive. Items without a string `name` are kept
/// verbatim and never matched. When nothing changes the document is left
/// untouched, so an absent section stays absent.
///
/// Fails only if the section exists but is not a list.
pub fn apply_registries(doc: &mut ManifestDocument, candidates: &[RegistryEntry]) -> Result<MergeOutcome> {
    let mut items = doc.get_list(SCOPED_REGISTRIES_KEY)?.cloned().unwrap_or_default();
    let existing: Vec<Existing> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| read_existing(index, item))
        .collect();

    let current: Vec<RegistryEntry> = existing.iter().map(|e| e.entry.clone()).collect();
    let merged = merge_registries(&current, candidates);

    let mut outcome = MergeOutcome::default();
    for (slot, result) in existing.iter().zip(&merged) {
        let grown = &result.scopes()[slot.entry.scopes().len()..];
        if grown.is_empty() {
            outcome.registries.push(slot.entry.clone());
        } else if slot.extensible {
            tracing::debug!(registry = %result.name, added = grown.len(), "Extended registry scopes");
            append_scopes(&mut items[slot.index], grown);
            outcome.scopes_added += grown.len();
            outcome.registries.push(result.clone());
        } else {
            tracing::warn!(
                registry = %result.name,
                "Cannot add scopes to a registry whose 'scopes' is not a list, leaving it as is"
            );
            outcome.registries.push(slot.entry.clone());
        }
    }

    for added in &merged[existing.len()..] {
        tracing::debug!(registry = %added.name, url = %added.url, "Adding registry");
        items.push(added.to_value());
        outcome.added += 1;
        outcome.registries.push(added.clone());
    }

    if outcome.changed() {
        doc.set(SCOPED_REGISTRIES_KEY, Value::Array(items));
    }
    Ok(outcome)
}

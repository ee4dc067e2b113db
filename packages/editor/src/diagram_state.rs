//! # Diagram State
//!
//! Immutable snapshot of one sentence diagram plus the schema-aware
//! operations that compute edits against it.
//!
//! Operations never mutate the receiver. Each one validates everything up
//! front and returns the full batch of [`AtomicChange`]s the edit needs, or an
//! error and no changes at all. Apply a batch with [`DiagramState::apply`] or
//! stage it on a [`crate::HistoryState`].
//!
//! ## Back-references
//!
//! Every non-root element records the single parent referencing it in `ref`.
//! All reference edits keep both directions in sync: a batch that changes a
//! parent property also sets or clears the `ref` of every child it attaches
//! or detaches.

use crate::atomic_change::{self, AtomicChange, KeyPath};
use crate::errors::{DiagramError, DiagramResult};
use diagrammer_grammar::{
    assign_word_ids, get_element_definition, init_element, scan, Element, ElementId,
    ElementReference, ElementType, IdGenerator, PropertyDefinition, PropertyValue, SchemaError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// One element of a diagram, with its type tag and back-reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawItem")]
pub struct DiagramStateItem {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub value: Element,
    /// Id of the parent currently referencing this element
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
}

/// Wire shape of an item before its value is decoded against its type
#[derive(Deserialize)]
struct RawItem {
    #[serde(rename = "type")]
    element_type: ElementType,
    value: Value,
    #[serde(rename = "ref", default)]
    parent: Option<ElementId>,
}

impl TryFrom<RawItem> for DiagramStateItem {
    type Error = SchemaError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        Ok(Self {
            element_type: raw.element_type,
            value: Element::from_value(raw.element_type, raw.value)?,
            parent: raw.parent,
        })
    }
}

impl DiagramStateItem {
    pub fn new(element_type: ElementType, value: Element) -> Self {
        Self {
            element_type,
            value,
            parent: None,
        }
    }

    pub fn id(&self) -> &str {
        self.value.id()
    }

    /// Flattened references held by this item
    pub fn references(&self) -> Vec<ElementReference> {
        get_element_references(self.element_type, &self.value)
    }
}

/// Which properties of a parent hold a given child.
///
/// A child may be referenced through two properties at once, e.g. a relative
/// pronoun serving as both `dependentWord` and `subject` of its clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencingProperties {
    One(&'static str),
    Pair(&'static str, &'static str),
}

impl ReferencingProperties {
    pub fn keys(&self) -> Vec<&'static str> {
        match *self {
            ReferencingProperties::One(key) => vec![key],
            ReferencingProperties::Pair(first, second) => vec![first, second],
        }
    }

    pub fn count(&self) -> usize {
        match self {
            ReferencingProperties::One(_) => 1,
            ReferencingProperties::Pair(..) => 2,
        }
    }

    pub fn contains(&self, property: &str) -> bool {
        self.keys().contains(&property)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramState {
    /// Word ids in sentence order; fixed at creation
    pub word_order: Vec<ElementId>,
    pub elements: BTreeMap<ElementId, DiagramStateItem>,
}

/// Path of an item in the serialized state
pub fn item_path(id: &str) -> KeyPath {
    KeyPath::root().key("elements").key(id)
}

/// Path of an item's back-reference
pub fn ref_path(id: &str) -> KeyPath {
    item_path(id).key("ref")
}

/// Path of one property of an item's value
pub fn property_path(id: &str, property: &str) -> KeyPath {
    item_path(id).key("value").key(property)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> DiagramResult<Value> {
    serde_json::to_value(value).map_err(|e| DiagramError::Change(e.into()))
}

/// Flattened references of an element, in schema declaration order
pub fn get_element_references(element_type: ElementType, value: &Element) -> Vec<ElementReference> {
    let Ok(definition) = get_element_definition(element_type) else {
        return Vec::new();
    };

    definition
        .properties
        .iter()
        .filter_map(|property| value.property(property.name))
        .flat_map(|property_value| property_value.references().iter().cloned())
        .collect()
}

/// Properties of a parent value that reference `child_id`.
///
/// `None` when the parent does not reference the child at all.
pub fn get_referencing_properties(
    parent_type: ElementType,
    parent_value: &Element,
    child_id: &str,
) -> DiagramResult<Option<ReferencingProperties>> {
    let Ok(definition) = get_element_definition(parent_type) else {
        return Ok(None);
    };

    let keys: Vec<&'static str> = definition
        .properties
        .iter()
        .filter(|property| {
            parent_value
                .property(property.name)
                .map_or(false, |value| value.contains(child_id))
        })
        .map(|property| property.name)
        .collect();

    match keys.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(ReferencingProperties::One(*one))),
        [first, second] => Ok(Some(ReferencingProperties::Pair(*first, *second))),
        _ => Err(DiagramError::TooManyReferences {
            parent: parent_value.id().to_string(),
            child: child_id.to_string(),
        }),
    }
}

fn unique_ids(references: &[ElementReference]) -> Vec<&str> {
    let mut seen = HashSet::new();
    references
        .iter()
        .map(|reference| reference.id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

impl DiagramState {
    /// Seed a diagram with its words, in sentence order
    pub fn from_words<I, S>(words: I) -> DiagramResult<Self>
    where
        I: IntoIterator<Item = (ElementId, S)>,
        S: Into<String>,
    {
        let mut state = Self {
            word_order: Vec::new(),
            elements: BTreeMap::new(),
        };

        for (id, lexeme) in words {
            if state.elements.contains_key(&id) {
                return Err(DiagramError::DuplicateId(id));
            }
            let item = DiagramStateItem::new(ElementType::Word, Element::word(id.clone(), lexeme));
            state.elements.insert(id.clone(), item);
            state.word_order.push(id);
        }

        Ok(state)
    }

    /// Scan `text` and seed a diagram with its words
    pub fn from_text(text: &str) -> DiagramResult<Self> {
        Self::from_words(assign_word_ids(&scan(text)))
    }

    pub fn get_item(&self, id: &str) -> DiagramResult<&DiagramStateItem> {
        self.elements
            .get(id)
            .ok_or_else(|| DiagramError::NotFound(id.to_string()))
    }

    pub fn get_typed_item(&self, element_type: ElementType, id: &str) -> DiagramResult<&DiagramStateItem> {
        let item = self.get_item(id)?;
        if item.element_type != element_type {
            return Err(DiagramError::TypeMismatch {
                id: id.to_string(),
                expected: element_type,
                found: item.element_type,
            });
        }
        Ok(item)
    }

    /// Fold a batch into a new snapshot
    pub fn apply(&self, changes: &[AtomicChange]) -> DiagramResult<Self> {
        Ok(atomic_change::apply(self, changes)?)
    }

    /// Snapshot the batch was applied to
    pub fn apply_inverse(&self, changes: &[AtomicChange]) -> DiagramResult<Self> {
        Ok(atomic_change::apply_inverse(self, changes)?)
    }

    fn property_definition(
        &self,
        element_type: ElementType,
        property: &str,
    ) -> DiagramResult<&'static PropertyDefinition> {
        get_element_definition(element_type)?
            .property(property)
            .ok_or_else(|| DiagramError::UnknownProperty {
                element_type,
                property: property.to_string(),
            })
    }

    /// Ids of every ancestor of `id`, nearest first
    pub fn ancestor_ids(&self, id: &str) -> DiagramResult<Vec<ElementId>> {
        let mut ancestors: Vec<ElementId> = Vec::new();
        let mut current = self.get_item(id)?;

        while let Some(parent_id) = &current.parent {
            if parent_id == id || ancestors.contains(parent_id) {
                return Err(DiagramError::CycleDetected {
                    parent: parent_id.clone(),
                    child: current.id().to_string(),
                });
            }
            ancestors.push(parent_id.clone());
            current = self.get_item(parent_id)?;
        }

        Ok(ancestors)
    }

    /// Create a blank element of `element_type` with an id from `ids`.
    ///
    /// Returns the new id and a single Set change inserting the item.
    pub fn create_add_item(
        &self,
        element_type: ElementType,
        ids: &mut impl IdGenerator,
    ) -> DiagramResult<(ElementId, AtomicChange)> {
        let id = ids.next_id();
        if element_type.is_word() {
            return Err(DiagramError::WordNotEditable(id));
        }
        if self.elements.contains_key(&id) {
            return Err(DiagramError::DuplicateId(id));
        }

        let item = DiagramStateItem::new(element_type, init_element(element_type, id.clone())?);
        let change = AtomicChange::set(item_path(&id), None, to_json(&item)?);

        debug!(id = %id, element_type = %element_type, "Computed add item");
        Ok((id, change))
    }

    /// Change removing `child_id` from one property of `parent`
    fn remove_from_property(
        &self,
        parent: &DiagramStateItem,
        property: &str,
        child_id: &str,
    ) -> DiagramResult<AtomicChange> {
        let path = property_path(parent.id(), property);
        let current = parent
            .value
            .property(property)
            .ok_or_else(|| DiagramError::MissingReference {
                parent: parent.id().to_string(),
                property: property.to_string(),
                child: child_id.to_string(),
            })?;
        let curr_val = to_json(current)?;

        match current {
            PropertyValue::Array(references) => {
                let remaining: Vec<ElementReference> = references
                    .iter()
                    .filter(|reference| reference.id != child_id)
                    .cloned()
                    .collect();
                if remaining.is_empty() {
                    Ok(AtomicChange::delete(path, curr_val))
                } else {
                    let new_val = to_json(&PropertyValue::Array(remaining))?;
                    Ok(AtomicChange::set(path, Some(curr_val), new_val))
                }
            }
            PropertyValue::Single(_) => Ok(AtomicChange::delete(path, curr_val)),
        }
    }

    /// Changes removing `child_id` from every property of `parent` holding it
    fn detach_from_parent(
        &self,
        parent: &DiagramStateItem,
        child_id: &str,
    ) -> DiagramResult<Vec<AtomicChange>> {
        let keys = get_referencing_properties(parent.element_type, &parent.value, child_id)?
            .ok_or_else(|| DiagramError::DanglingBackReference {
                parent: parent.id().to_string(),
                child: child_id.to_string(),
            })?;

        keys.keys()
            .into_iter()
            .map(|key| self.remove_from_property(parent, key, child_id))
            .collect()
    }

    /// Delete a non-word element.
    ///
    /// The batch removes the element from its parent, clears the `ref` of
    /// every child and finally deletes the item.
    pub fn create_delete_item(&self, id: &str) -> DiagramResult<Vec<AtomicChange>> {
        let item = self.get_item(id)?;
        if item.element_type.is_word() {
            return Err(DiagramError::WordNotEditable(id.to_string()));
        }

        let mut changes = Vec::new();

        if let Some(parent_id) = &item.parent {
            let parent = self.get_item(parent_id)?;
            changes.extend(self.detach_from_parent(parent, id)?);
        }

        let references = item.references();
        for child_id in unique_ids(&references) {
            let child = self.get_item(child_id)?;
            if child.parent.as_deref() != Some(id) {
                return Err(DiagramError::NotReferencedBy {
                    parent: id.to_string(),
                    child: child_id.to_string(),
                });
            }
            changes.push(AtomicChange::delete(ref_path(child_id), Value::from(id)));
        }

        changes.push(AtomicChange::delete(item_path(id), to_json(item)?));

        debug!(id = %id, changes = changes.len(), "Computed delete item");
        Ok(changes)
    }

    /// Attach `child_id` to `property` of the parent.
    ///
    /// Appends to array properties and replaces single-valued ones. A child
    /// that already has a different parent is moved: the batch also removes
    /// it from the prior parent.
    pub fn create_add_reference(
        &self,
        parent_type: ElementType,
        parent_id: &str,
        property: &str,
        child_id: &str,
    ) -> DiagramResult<Vec<AtomicChange>> {
        let parent = self.get_typed_item(parent_type, parent_id)?;
        let child = self.get_item(child_id)?;
        let definition = self.property_definition(parent_type, property)?;

        if !definition.allows(child.element_type) {
            return Err(DiagramError::DisallowedReference {
                parent_type,
                property: property.to_string(),
                child_type: child.element_type,
            });
        }
        if parent_id == child_id {
            return Err(DiagramError::SelfReference(child_id.to_string()));
        }
        if self.ancestor_ids(parent_id)?.iter().any(|ancestor| ancestor == child_id) {
            return Err(DiagramError::CycleDetected {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            });
        }

        let reference = ElementReference::new(child_id, child.element_type);
        let current = parent.value.property(property);
        let mut displaced = None;

        let new_value = match (definition.is_array, current) {
            (true, Some(PropertyValue::Array(references))) => {
                if references.iter().any(|r| r.id == child_id) {
                    return Err(DiagramError::AlreadyContains {
                        parent: parent_id.to_string(),
                        property: property.to_string(),
                        child: child_id.to_string(),
                    });
                }
                let mut references = references.clone();
                references.push(reference);
                PropertyValue::Array(references)
            }
            (true, None) => PropertyValue::Array(vec![reference]),
            (false, Some(PropertyValue::Single(existing))) => {
                if existing.id == child_id {
                    return Err(DiagramError::AlreadyReferences {
                        parent: parent_id.to_string(),
                        property: property.to_string(),
                        child: child_id.to_string(),
                    });
                }
                displaced = Some(existing.id.as_str());
                PropertyValue::Single(reference)
            }
            (false, None) => PropertyValue::Single(reference),
            (true, Some(PropertyValue::Single(_))) => {
                return Err(DiagramError::ExpectedArray {
                    element_type: parent_type,
                    property: property.to_string(),
                })
            }
            (false, Some(PropertyValue::Array(_))) => {
                return Err(DiagramError::ExpectedValue {
                    element_type: parent_type,
                    property: property.to_string(),
                })
            }
        };

        if let Some(keys) = get_referencing_properties(parent_type, &parent.value, child_id)? {
            if keys.count() >= 2 {
                return Err(DiagramError::TooManyReferences {
                    parent: parent_id.to_string(),
                    child: child_id.to_string(),
                });
            }
        }

        let mut changes = Vec::new();

        if let Some(prior_id) = child.parent.as_deref().filter(|prior| *prior != parent_id) {
            let prior = self.get_item(prior_id)?;
            changes.extend(self.detach_from_parent(prior, child_id)?);
        }

        changes.push(AtomicChange::set(
            property_path(parent_id, property),
            current.map(to_json).transpose()?,
            to_json(&new_value)?,
        ));

        if let Some(displaced_id) = displaced {
            // Still held through another property of the same parent
            let shared = get_referencing_properties(parent_type, &parent.value, displaced_id)?
                .map_or(false, |keys| keys.count() > 1);
            let displaced_item = self.get_item(displaced_id)?;
            if !shared && displaced_item.parent.as_deref() == Some(parent_id) {
                changes.push(AtomicChange::delete(ref_path(displaced_id), Value::from(parent_id)));
            }
        }

        if child.parent.as_deref() != Some(parent_id) {
            changes.push(AtomicChange::set(
                ref_path(child_id),
                child.parent.as_deref().map(Value::from),
                Value::from(parent_id),
            ));
        }

        debug!(
            parent = %parent_id,
            property = %property,
            child = %child_id,
            changes = changes.len(),
            "Computed add reference"
        );
        Ok(changes)
    }

    /// [`Self::create_add_reference`] that also checks the child's type
    pub fn create_typed_add_reference(
        &self,
        parent_type: ElementType,
        parent_id: &str,
        property: &str,
        child_type: ElementType,
        child_id: &str,
    ) -> DiagramResult<Vec<AtomicChange>> {
        self.get_typed_item(child_type, child_id)?;
        self.create_add_reference(parent_type, parent_id, property, child_id)
    }

    /// Detach `child_id` from `property` of the parent
    pub fn create_delete_reference(
        &self,
        parent_type: ElementType,
        parent_id: &str,
        property: &str,
        child_id: &str,
    ) -> DiagramResult<Vec<AtomicChange>> {
        let parent = self.get_typed_item(parent_type, parent_id)?;
        let child = self.get_item(child_id)?;
        let definition = self.property_definition(parent_type, property)?;
        let current = parent.value.property(property);

        if definition.is_array {
            match current.map_or(0, |value| value.count(child_id)) {
                0 => {
                    return Err(DiagramError::MissingArrayReference {
                        parent: parent_id.to_string(),
                        property: property.to_string(),
                        child: child_id.to_string(),
                    })
                }
                1 => {}
                _ => {
                    return Err(DiagramError::MultipleReferences {
                        parent: parent_id.to_string(),
                        property: property.to_string(),
                        child: child_id.to_string(),
                    })
                }
            }
        } else if !matches!(current, Some(PropertyValue::Single(r)) if r.id == child_id) {
            return Err(DiagramError::MissingReference {
                parent: parent_id.to_string(),
                property: property.to_string(),
                child: child_id.to_string(),
            });
        }

        if child.parent.as_deref() != Some(parent_id) {
            return Err(DiagramError::NotReferencedBy {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            });
        }

        let mut changes = vec![self.remove_from_property(parent, property, child_id)?];

        let shared = get_referencing_properties(parent_type, &parent.value, child_id)?
            .map_or(false, |keys| keys.count() > 1);
        if !shared {
            changes.push(AtomicChange::delete(ref_path(child_id), Value::from(parent_id)));
        }

        debug!(
            parent = %parent_id,
            property = %property,
            child = %child_id,
            "Computed delete reference"
        );
        Ok(changes)
    }

    /// Replace a property wholesale. `None` (or an empty array) clears it.
    pub fn set_reference(
        &self,
        parent_id: &str,
        property: &str,
        new_value: Option<PropertyValue>,
    ) -> DiagramResult<Vec<AtomicChange>> {
        let parent_type = self.get_item(parent_id)?.element_type;
        self.set_typed_reference(parent_type, parent_id, property, new_value)
    }

    /// Replace a property wholesale on a parent of known type.
    ///
    /// Computes the minimal set of detaches and attaches between the current
    /// and requested ids, then a final Set when the resulting order differs
    /// from the requested order.
    pub fn set_typed_reference(
        &self,
        parent_type: ElementType,
        parent_id: &str,
        property: &str,
        new_value: Option<PropertyValue>,
    ) -> DiagramResult<Vec<AtomicChange>> {
        let parent = self.get_typed_item(parent_type, parent_id)?;
        let definition = self.property_definition(parent_type, property)?;
        let current = parent.value.property(property).cloned();

        if current.is_none() && new_value.is_none() {
            return Err(DiagramError::BothUndefined {
                id: parent_id.to_string(),
                property: property.to_string(),
            });
        }

        match (&new_value, definition.is_array) {
            (Some(PropertyValue::Single(_)), true) => {
                return Err(DiagramError::ExpectedArray {
                    element_type: parent_type,
                    property: property.to_string(),
                })
            }
            (Some(PropertyValue::Array(_)), false) => {
                return Err(DiagramError::ExpectedValue {
                    element_type: parent_type,
                    property: property.to_string(),
                })
            }
            _ => {}
        }

        let requested: Vec<ElementReference> = new_value
            .as_ref()
            .map(|value| value.references().to_vec())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        for reference in &requested {
            if !seen.insert(reference.id.as_str()) {
                return Err(DiagramError::MultipleReferences {
                    parent: parent_id.to_string(),
                    property: property.to_string(),
                    child: reference.id.clone(),
                });
            }
            let child = self.get_typed_item(reference.element_type, &reference.id)?;
            if !definition.allows(child.element_type) {
                return Err(DiagramError::DisallowedReference {
                    parent_type,
                    property: property.to_string(),
                    child_type: child.element_type,
                });
            }
        }

        let current_ids: Vec<&str> = current.as_ref().map(|v| v.ids().collect()).unwrap_or_default();
        let removed: Vec<&str> = current_ids
            .iter()
            .copied()
            .filter(|id| !seen.contains(id))
            .collect();
        let added: Vec<&str> = requested
            .iter()
            .map(|reference| reference.id.as_str())
            .filter(|id| !current_ids.contains(id))
            .collect();

        let mut working = self.clone();
        let mut changes = Vec::new();

        for child_id in removed {
            let step = working.create_delete_reference(parent_type, parent_id, property, child_id)?;
            working = working.apply(&step)?;
            changes.extend(step);
        }
        for child_id in added {
            let step = working.create_add_reference(parent_type, parent_id, property, child_id)?;
            working = working.apply(&step)?;
            changes.extend(step);
        }

        let desired = match new_value {
            Some(PropertyValue::Array(references)) if references.is_empty() => None,
            other => other,
        };
        let actual = working.get_item(parent_id)?.value.property(property).cloned();

        if actual != desired {
            let path = property_path(parent_id, property);
            match (actual, desired) {
                (Some(actual), Some(desired)) => {
                    changes.push(AtomicChange::set(path, Some(to_json(&actual)?), to_json(&desired)?))
                }
                (None, Some(desired)) => changes.push(AtomicChange::set(path, None, to_json(&desired)?)),
                (Some(actual), None) => changes.push(AtomicChange::delete(path, to_json(&actual)?)),
                (None, None) => {}
            }
        }

        debug!(
            parent = %parent_id,
            property = %property,
            changes = changes.len(),
            "Computed set reference"
        );
        Ok(changes)
    }

    /// Clear a property, releasing every child it held.
    ///
    /// An absent property yields an empty batch.
    pub fn create_delete_property(&self, id: &str, property: &str) -> DiagramResult<Vec<AtomicChange>> {
        let item = self.get_item(id)?;
        if item.element_type.is_word() {
            return Err(DiagramError::WordNotEditable(id.to_string()));
        }
        self.property_definition(item.element_type, property)?;

        let Some(current) = item.value.property(property) else {
            return Ok(Vec::new());
        };

        let mut changes = vec![AtomicChange::delete(property_path(id, property), to_json(current)?)];

        for child_id in unique_ids(current.references()) {
            let shared = get_referencing_properties(item.element_type, &item.value, child_id)?
                .map_or(false, |keys| keys.count() > 1);
            if shared {
                continue;
            }
            let child = self.get_item(child_id)?;
            if child.parent.as_deref() != Some(id) {
                return Err(DiagramError::NotReferencedBy {
                    parent: id.to_string(),
                    child: child_id.to_string(),
                });
            }
            changes.push(AtomicChange::delete(ref_path(child_id), Value::from(id)));
        }

        debug!(id = %id, property = %property, changes = changes.len(), "Computed delete property");
        Ok(changes)
    }

    /// Non-word elements that reference nothing, directly or only through
    /// other empty elements. Children come before their parents.
    pub fn get_empty_elements(&self) -> Vec<ElementId> {
        let mut empty: Vec<ElementId> = Vec::new();
        let mut found: HashSet<&str> = HashSet::new();

        loop {
            let before = empty.len();
            for (id, item) in &self.elements {
                if item.element_type.is_word() || found.contains(id.as_str()) {
                    continue;
                }
                let populated = item
                    .references()
                    .iter()
                    .any(|reference| !found.contains(reference.id.as_str()));
                if !populated {
                    found.insert(id.as_str());
                    empty.push(id.clone());
                }
            }
            if empty.len() == before {
                break;
            }
        }

        empty
    }

    /// Batch deleting every element from [`Self::get_empty_elements`]
    pub fn create_delete_empty_elements(&self) -> DiagramResult<Vec<AtomicChange>> {
        let mut working = self.clone();
        let mut changes = Vec::new();

        for id in self.get_empty_elements() {
            let step = working.create_delete_item(&id)?;
            working = working.apply(&step)?;
            changes.extend(step);
        }

        debug!(changes = changes.len(), "Computed delete empty elements");
        Ok(changes)
    }

    pub fn get_word_index(&self, id: &str) -> DiagramResult<usize> {
        self.word_order
            .iter()
            .position(|word| word == id)
            .ok_or_else(|| DiagramError::NotAWord(id.to_string()))
    }

    /// Position of the first word an element covers
    pub fn first_word_index(&self, id: &str) -> Option<usize> {
        let item = self.elements.get(id)?;
        if item.element_type.is_word() {
            return self.get_word_index(id).ok();
        }
        item.references()
            .iter()
            .filter_map(|reference| self.first_word_index(&reference.id))
            .min()
    }

    /// Comparator ordering ids by their position in the sentence.
    ///
    /// Non-words sort by the first word they cover; ids covering no word sort
    /// last, by id.
    pub fn word_sorter(&self) -> impl Fn(&str, &str) -> Ordering + '_ {
        let index: HashMap<&str, usize> = self
            .word_order
            .iter()
            .enumerate()
            .map(|(position, id)| (id.as_str(), position))
            .collect();

        move |a: &str, b: &str| {
            let position = |id: &str| {
                index
                    .get(id)
                    .copied()
                    .or_else(|| self.first_word_index(id))
                    .unwrap_or(usize::MAX)
            };
            position(a).cmp(&position(b)).then_with(|| a.cmp(b))
        }
    }

    /// Check the reference invariants over the whole state
    pub fn validate(&self) -> DiagramResult<()> {
        for id in &self.word_order {
            self.get_typed_item(ElementType::Word, id)?;
        }

        for (id, item) in &self.elements {
            if item.id() != id {
                return Err(DiagramError::NotFound(item.id().to_string()));
            }

            for reference in item.references() {
                let child = self.get_typed_item(reference.element_type, &reference.id)?;
                if child.parent.as_deref() != Some(id.as_str()) {
                    return Err(DiagramError::NotReferencedBy {
                        parent: id.clone(),
                        child: reference.id.clone(),
                    });
                }
            }

            if let Some(properties) = item.value.properties() {
                for (property, value) in properties {
                    if let Some(duplicate) = value.ids().find(|child| value.count(child) > 1) {
                        return Err(DiagramError::MultipleReferences {
                            parent: id.clone(),
                            property: property.clone(),
                            child: duplicate.to_string(),
                        });
                    }
                }
            }

            if let Some(parent_id) = &item.parent {
                let parent = self.get_item(parent_id)?;
                if get_referencing_properties(parent.element_type, &parent.value, id)?.is_none() {
                    return Err(DiagramError::DanglingBackReference {
                        parent: parent_id.clone(),
                        child: id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ids(names: &'static [&'static str]) -> impl FnMut() -> ElementId {
        let mut names = names.iter();
        move || names.next().expect("ran out of ids").to_string()
    }

    fn add(state: &DiagramState, element_type: ElementType, id: &'static str) -> DiagramState {
        let (_, change) = state
            .create_add_item(element_type, &mut || id.to_string())
            .unwrap();
        state.apply(&[change]).unwrap()
    }

    fn link(
        state: &DiagramState,
        parent_type: ElementType,
        parent: &str,
        property: &str,
        child: &str,
    ) -> DiagramState {
        let changes = state
            .create_add_reference(parent_type, parent, property, child)
            .unwrap();
        state.apply(&changes).unwrap()
    }

    #[test]
    fn test_from_text_seeds_words() {
        let state = DiagramState::from_text("The dog saw the cat.").unwrap();
        assert_eq!(state.word_order, vec!["the1", "dog", "saw", "the2", "cat"]);
        assert_eq!(state.get_item("dog").unwrap().value.lexeme(), Some("dog"));
        assert_eq!(state.get_word_index("the2").unwrap(), 3);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_duplicate_words_are_rejected() {
        let err = DiagramState::from_words(vec![("a".to_string(), "a"), ("a".to_string(), "b")])
            .unwrap_err();
        assert_eq!(err, DiagramError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_create_add_item_is_a_single_set() {
        let state = DiagramState::from_text("quickly").unwrap();
        let (id, change) = state
            .create_add_item(ElementType::AdverbPhrase, &mut ids(&["ap"]))
            .unwrap();

        assert_eq!(id, "ap");
        assert_eq!(change.key, item_path("ap"));
        assert_eq!(change.curr_val, None);
        assert_eq!(
            change.new_val,
            Some(json!({ "type": "adverbPhrase", "value": { "id": "ap", "phraseType": "adverb" } }))
        );
    }

    #[test]
    fn test_words_cannot_be_created_or_deleted() {
        let state = DiagramState::from_text("dog").unwrap();
        assert!(matches!(
            state.create_add_item(ElementType::Word, &mut ids(&["w"])),
            Err(DiagramError::WordNotEditable(_))
        ));
        assert_eq!(
            state.create_delete_item("dog"),
            Err(DiagramError::WordNotEditable("dog".to_string()))
        );
    }

    #[test]
    fn test_add_reference_sets_both_directions() {
        let state = DiagramState::from_text("dog").unwrap();
        let state = add(&state, ElementType::Noun, "n");
        let state = link(&state, ElementType::Noun, "n", "words", "dog");

        assert_eq!(state.get_item("dog").unwrap().parent.as_deref(), Some("n"));
        assert_eq!(
            get_referencing_properties(ElementType::Noun, &state.get_item("n").unwrap().value, "dog")
                .unwrap(),
            Some(ReferencingProperties::One("words"))
        );
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_add_reference_moves_child_between_parents() {
        let state = DiagramState::from_text("dog").unwrap();
        let state = add(&state, ElementType::Noun, "n1");
        let state = add(&state, ElementType::Noun, "n2");
        let state = link(&state, ElementType::Noun, "n1", "words", "dog");

        let changes = state
            .create_add_reference(ElementType::Noun, "n2", "words", "dog")
            .unwrap();
        assert_eq!(changes.len(), 3);

        let state = state.apply(&changes).unwrap();
        assert!(state.get_item("n1").unwrap().value.property("words").is_none());
        assert_eq!(state.get_item("dog").unwrap().parent.as_deref(), Some("n2"));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_replacing_single_value_releases_displaced_child() {
        let state = DiagramState::from_text("dog cat").unwrap();
        let state = add(&state, ElementType::Noun, "dogNoun");
        let state = add(&state, ElementType::Noun, "catNoun");
        let state = add(&state, ElementType::NounPhrase, "np");
        let state = link(&state, ElementType::NounPhrase, "np", "head", "dogNoun");
        let state = link(&state, ElementType::NounPhrase, "np", "head", "catNoun");

        assert_eq!(state.get_item("dogNoun").unwrap().parent, None);
        assert_eq!(state.get_item("catNoun").unwrap().parent.as_deref(), Some("np"));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_self_reference_and_cycles_are_rejected() {
        let state = DiagramState::from_text("dog").unwrap();
        let state = add(&state, ElementType::CoordinatedNounPhrase, "outer");
        let state = add(&state, ElementType::NounPhrase, "np");
        let state = add(&state, ElementType::CoordinatedNounPhrase, "inner");
        let state = link(&state, ElementType::CoordinatedNounPhrase, "outer", "items", "np");
        let state = link(&state, ElementType::NounPhrase, "np", "head", "inner");

        let state = add(&state, ElementType::AdverbPhrase, "ap");
        assert_eq!(
            state.create_add_reference(ElementType::AdverbPhrase, "ap", "modifiers", "ap"),
            Err(DiagramError::SelfReference("ap".to_string()))
        );
        assert_eq!(
            state.create_add_reference(ElementType::CoordinatedNounPhrase, "inner", "items", "np"),
            Err(DiagramError::CycleDetected {
                parent: "inner".to_string(),
                child: "np".to_string()
            })
        );
    }

    #[test]
    fn test_double_duty_reference() {
        let state = DiagramState::from_text("who").unwrap();
        let state = add(&state, ElementType::Pronoun, "who_");
        let state = add(&state, ElementType::RelativeClause, "rc");
        let state = link(&state, ElementType::RelativeClause, "rc", "dependentWord", "who_");
        let changes = state
            .create_add_reference(ElementType::RelativeClause, "rc", "subject", "who_")
            .unwrap();
        assert_eq!(changes.len(), 1, "back-reference already points at the clause");
        let state = state.apply(&changes).unwrap();

        let keys = get_referencing_properties(
            ElementType::RelativeClause,
            &state.get_item("rc").unwrap().value,
            "who_",
        )
        .unwrap();
        assert_eq!(keys, Some(ReferencingProperties::Pair("dependentWord", "subject")));

        // Releasing one role keeps the back-reference
        let changes = state
            .create_delete_reference(ElementType::RelativeClause, "rc", "subject", "who_")
            .unwrap();
        assert_eq!(changes.len(), 1);
        let state = state.apply(&changes).unwrap();
        assert_eq!(state.get_item("who_").unwrap().parent.as_deref(), Some("rc"));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_delete_property_cascades_ref_clears() {
        let state = DiagramState::from_text("big red").unwrap();
        let state = add(&state, ElementType::Adjective, "adj");
        let state = link(&state, ElementType::Adjective, "adj", "words", "big");
        let state = link(&state, ElementType::Adjective, "adj", "words", "red");

        let changes = state.create_delete_property("adj", "words").unwrap();
        assert_eq!(changes.len(), 3);
        let state = state.apply(&changes).unwrap();
        assert_eq!(state.get_item("big").unwrap().parent, None);
        assert_eq!(state.get_item("red").unwrap().parent, None);

        assert!(state.create_delete_property("adj", "words").unwrap().is_empty());
        assert!(matches!(
            state.create_delete_property("adj", "head"),
            Err(DiagramError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_empty_elements_are_found_transitively() {
        let state = DiagramState::from_text("dog").unwrap();
        let state = add(&state, ElementType::Noun, "n");
        let state = add(&state, ElementType::NounPhrase, "np");
        let state = add(&state, ElementType::IndependentClause, "ic");
        let state = link(&state, ElementType::NounPhrase, "np", "head", "n");
        let state = link(&state, ElementType::IndependentClause, "ic", "subject", "np");

        assert_eq!(state.get_empty_elements(), vec!["n", "np", "ic"]);

        let state = state.apply(&state.create_delete_empty_elements().unwrap()).unwrap();
        assert_eq!(state.elements.len(), 1);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_word_sorter_uses_sentence_order() {
        let state = DiagramState::from_text("big red dog").unwrap();
        let state = add(&state, ElementType::Noun, "n");
        let state = link(&state, ElementType::Noun, "n", "words", "dog");

        let sorter = state.word_sorter();
        let mut ids = vec!["n", "red", "big"];
        ids.sort_by(|a, b| sorter(*a, *b));
        assert_eq!(ids, vec!["big", "red", "n"]);

        assert_eq!(
            state.get_word_index("n"),
            Err(DiagramError::NotAWord("n".to_string()))
        );
    }

    #[test]
    fn test_state_serializes_with_camel_case_keys() {
        let state = DiagramState::from_text("dog").unwrap();
        let state = add(&state, ElementType::Noun, "n");
        let state = link(&state, ElementType::Noun, "n", "words", "dog");

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["wordOrder"], json!(["dog"]));
        assert_eq!(value["elements"]["dog"]["ref"], json!("n"));
        assert_eq!(
            value["elements"]["n"]["value"]["words"],
            json!([{ "id": "dog", "type": "word" }])
        );

        let back: DiagramState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }
}

//! Compositing layers: explicit ordered element lists with stable handles.
//!
//! Undo entries address elements by handle. Undoing detaches an element from
//! the draw order while the arena keeps it alive, so redo can re-attach the
//! same element at its recorded position and keep stacking deterministic.

use crate::model::Element;
use slab::Slab;

/// Stable handle to an element within one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// The two compositing layers of a locked session. Pixelation is always
/// painted beneath annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Pixelation,
    Annotation,
}

#[derive(Debug, Default)]
pub struct Layer {
    arena: Slab<Element>,
    order: Vec<ElementId>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `element` on top of the draw order and returns its handle.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.arena.insert(element));
        self.order.push(id);
        id
    }

    /// Position of `id` in the draw order, if attached.
    pub fn z_index(&self, id: ElementId) -> Option<usize> {
        self.order.iter().position(|entry| *entry == id)
    }

    /// Removes `id` from the draw order but keeps the element alive for a
    /// later [`Layer::attach`]. Returns the position it held.
    pub fn detach(&mut self, id: ElementId) -> Option<usize> {
        let index = self.z_index(id)?;
        self.order.remove(index);
        Some(index)
    }

    /// Re-inserts a detached element at `index` (clamped to the current
    /// order length).
    pub fn attach(&mut self, id: ElementId, index: usize) {
        if !self.arena.contains(id.0) || self.z_index(id).is_some() {
            return;
        }
        let index = index.min(self.order.len());
        self.order.insert(index, id);
    }

    /// Drops the element entirely, used when a stroke is cancelled mid-draw.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        if let Some(index) = self.z_index(id) {
            self.order.remove(index);
        }
        self.arena.try_remove(id.0)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.arena.get_mut(id.0)
    }

    /// Attached elements in draw order, bottom first.
    pub fn visible(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.arena.get(id.0))
    }

    /// Number of attached elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
    }
}

/// Both layers of one locked-selection session.
#[derive(Debug, Default)]
pub struct LayerSet {
    pub pixelation: Layer,
    pub annotation: Layer,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Pixelation => &self.pixelation,
            LayerKind::Annotation => &self.annotation,
        }
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        match kind {
            LayerKind::Pixelation => &mut self.pixelation,
            LayerKind::Annotation => &mut self.annotation,
        }
    }

    pub fn clear(&mut self) {
        self.pixelation.clear();
        self.annotation.clear();
    }
}

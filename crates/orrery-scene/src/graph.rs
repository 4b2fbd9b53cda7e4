//! Transform hierarchy with index-based parents.
//!
//! Parents are stored by index and must precede their children, so a single
//! forward pass composes every node and cycles cannot be expressed.

use glam::Mat4;

#[derive(Debug, Clone)]
struct Node {
    parent: Option<usize>,
    local: Mat4,
}

/// Parent-relative transforms plus a cache of composed ones.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    composed: Vec<Mat4>,
    /// Set by any local change, cleared by [`propagate`](Self::propagate).
    dirty: bool,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index.
    ///
    /// # Panics
    ///
    /// If `parent` is not an already-inserted node.
    pub fn insert(&mut self, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        if let Some(p) = parent {
            assert!(p < index, "parent {p} must be inserted before child {index}");
        }
        self.nodes.push(Node {
            parent,
            local: Mat4::IDENTITY,
        });
        self.composed.push(Mat4::IDENTITY);
        self.dirty = true;
        index
    }

    pub fn set_local(&mut self, index: usize, local: Mat4) {
        self.nodes[index].local = local;
        self.dirty = true;
    }

    #[must_use]
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes[index].parent
    }

    /// Recompute every composed transform as `root · … · parent · local`.
    pub fn propagate(&mut self, root: Mat4) {
        for i in 0..self.nodes.len() {
            let base = match self.nodes[i].parent {
                Some(p) => self.composed[p],
                None => root,
            };
            self.composed[i] = base * self.nodes[i].local;
        }
        self.dirty = false;
    }

    /// Composed transform from the last [`propagate`](Self::propagate).
    #[must_use]
    pub fn composed(&self, index: usize) -> Mat4 {
        debug_assert!(!self.dirty, "scene graph read before propagate");
        self.composed[index]
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

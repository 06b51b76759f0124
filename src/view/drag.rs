//! Drag-and-drop re-parenting as an explicit state machine.

use serde::Serialize;

use crate::core::CategoryId;
use crate::tree::Forest;

/// Where, relative to the hovered row, the dragged node would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    /// Sibling placed before the target.
    Before,
    /// Child of the target.
    Inside,
    /// Sibling placed after the target.
    After,
}

impl DropPosition {
    /// Map the pointer's vertical offset within a row (0.0 top, 1.0 bottom).
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction < 0.25 {
            DropPosition::Before
        } else if fraction > 0.75 {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropTarget {
    Node(CategoryId),
    /// The top-level drop zone.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: CategoryId,
    },
    Over {
        source: CategoryId,
        target: DropTarget,
        position: DropPosition,
    },
}

/// A completed drop, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub id: CategoryId,
    pub target: DropTarget,
    pub position: DropPosition,
}

impl MoveRequest {
    /// The parent the dragged node should get, or `None` when the target is
    /// gone from `forest`. `Some(None)` means root level.
    pub fn resolve_parent(&self, forest: &Forest) -> Option<Option<CategoryId>> {
        let target = match self.target {
            DropTarget::Root => return Some(None),
            DropTarget::Node(target) => target,
        };
        let node = forest.find(target)?;
        match self.position {
            DropPosition::Inside => Some(Some(target)),
            // A dangling parent renders as root, so a sibling lands at root too.
            DropPosition::Before | DropPosition::After => {
                Some(node.parent_id().filter(|parent| forest.contains(*parent)))
            }
        }
    }
}

impl DragState {
    pub fn source(&self) -> Option<CategoryId> {
        match *self {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::Over { source, .. } => Some(source),
        }
    }

    pub fn start(&mut self, source: CategoryId) {
        *self = DragState::Dragging { source };
    }

    /// Hover `target`. Hovering the dragged node itself shows no drop hint.
    pub fn enter(&mut self, target: DropTarget, position: DropPosition) {
        let Some(source) = self.source() else {
            return;
        };
        if target == DropTarget::Node(source) {
            *self = DragState::Dragging { source };
            return;
        }
        let position = match target {
            DropTarget::Root => DropPosition::Inside,
            DropTarget::Node(_) => position,
        };
        *self = DragState::Over {
            source,
            target,
            position,
        };
    }

    pub fn leave(&mut self) {
        if let DragState::Over { source, .. } = *self {
            *self = DragState::Dragging { source };
        }
    }

    /// Finish the gesture. Always returns to `Idle`.
    pub fn drop(&mut self) -> Option<MoveRequest> {
        match std::mem::take(self) {
            DragState::Over {
                source,
                target,
                position,
            } => Some(MoveRequest {
                id: source,
                target,
                position,
            }),
            DragState::Idle | DragState::Dragging { .. } => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    /// Drop hint for the row showing `id`.
    pub fn hint_for(&self, id: CategoryId) -> Option<DropPosition> {
        match *self {
            DragState::Over {
                target: DropTarget::Node(target),
                position,
                ..
            } if target == id => Some(position),
            _ => None,
        }
    }
}

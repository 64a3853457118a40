//! Drag session state machine.
//!
//! One gesture at a time: pointer-down over a node arms the session (pulling
//! the node out of its tree if it was nested), every pointer-move moves the
//! node with the cursor and re-evaluates the nearest free socket, and
//! pointer-up either attaches the node into that socket or leaves it where it
//! was dropped. Every call returns a [`DragTransition`]; events that do not
//! apply to the current state come back as [`DragEffect::Noop`] with a reason
//! and never mutate anything.

use brickyard_core::{Offset, Point};
use brickyard_forest::{Forest, NodeId, Socket, VisualLayer};
use serde::{Deserialize, Serialize};

use crate::{DragConfig, DragConfigError, PointerButton};

const LOG_TARGET: &str = "brickyard.drag";

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Armed {
        node: NodeId,
        pointer_id: u32,
        button: PointerButton,
        /// Handle origin minus cursor at grab time.
        cursor_offset: Offset,
        candidate: Option<Socket>,
    },
}

impl DragState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    InvalidPointerId,
    PointerMismatch,
    ButtonNotAllowed,
    ButtonMismatch,
    InvalidPointerPosition,
    NoNodeUnderPointer,
    /// The dragged node was removed from the forest mid-gesture.
    DraggedNodeMissing,
    /// The dragged node was nested under a parent mid-gesture.
    DraggedNodeNested,
}

/// What one lifecycle step did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Armed {
        node: NodeId,
        pointer_id: u32,
        cursor_offset: Offset,
        /// Former parent when the grab pulled the node out of a tree.
        detached_from: Option<NodeId>,
    },
    Moved {
        node: NodeId,
        position: Point,
        candidate: Option<Socket>,
    },
    Attached {
        node: NodeId,
        socket: Socket,
    },
    /// Released with no candidate; the node stays a root.
    Dropped {
        node: NodeId,
        position: Point,
    },
    Canceled {
        node: NodeId,
        position: Point,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

/// Drag gesture state for one editing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    config: DragConfig,
    state: DragState,
    transition_counter: u64,
}

impl Default for DragSession {
    fn default() -> Self {
        Self {
            config: DragConfig::default(),
            state: DragState::Idle,
            transition_counter: 0,
        }
    }
}

impl DragSession {
    /// Construct a session with a validated configuration.
    pub fn new(config: DragConfig) -> Result<Self, DragConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn config(&self) -> DragConfig {
        self.config
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Node being dragged, if any.
    #[must_use]
    pub const fn dragged_node(&self) -> Option<NodeId> {
        match self.state {
            DragState::Armed { node, .. } => Some(node),
            DragState::Idle => None,
        }
    }

    /// Socket the node would drop into right now.
    #[must_use]
    pub const fn candidate(&self) -> Option<Socket> {
        match self.state {
            DragState::Armed { candidate, .. } => candidate,
            DragState::Idle => None,
        }
    }

    /// Grab the node under `cursor`.
    ///
    /// A nested node is detached from its parent immediately and keeps its
    /// on-screen location, so it does not jump under the cursor.
    pub fn pointer_down<H: VisualLayer>(
        &mut self,
        forest: &mut Forest<H>,
        pointer_id: u32,
        button: PointerButton,
        cursor: Point,
    ) -> DragTransition {
        if pointer_id == 0 {
            return self.noop(DragNoopReason::InvalidPointerId);
        }
        if self.state.is_active() {
            return self.noop(DragNoopReason::ActiveDragAlreadyInProgress);
        }
        if button != self.config.activation_button {
            return self.noop(DragNoopReason::ButtonNotAllowed);
        }
        if !cursor.is_finite() {
            return self.noop(DragNoopReason::InvalidPointerPosition);
        }
        let Some(node) = forest
            .host()
            .locate_node_at(cursor)
            .filter(|node| forest.contains(*node))
        else {
            return self.noop(DragNoopReason::NoNodeUnderPointer);
        };

        let stored = forest.node(node).map_or(Point::ORIGIN, |n| n.position());
        let origin = forest
            .host()
            .visual_origin(node)
            .filter(|point| point.is_finite())
            .unwrap_or(stored);
        let cursor_offset = cursor.offset_to(origin);

        let detached_from = match forest.parent_of(node) {
            Some(_) => match forest.detach_parent(node) {
                Ok(parent) => Some(parent),
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, node = %node, code = err.code(), "{err}");
                    None
                }
            },
            None => None,
        };

        tracing::debug!(
            target: LOG_TARGET,
            node = %node,
            pointer_id,
            detached = detached_from.is_some(),
            "drag armed"
        );
        let to = DragState::Armed {
            node,
            pointer_id,
            button,
            cursor_offset,
            candidate: None,
        };
        self.transition(
            to,
            DragEffect::Armed {
                node,
                pointer_id,
                cursor_offset,
                detached_from,
            },
        )
    }

    /// Move the dragged node with the cursor and refresh the drop candidate.
    pub fn pointer_move<H: VisualLayer>(
        &mut self,
        forest: &mut Forest<H>,
        pointer_id: u32,
        cursor: Point,
    ) -> DragTransition {
        let DragState::Armed {
            node,
            pointer_id: active_pointer,
            button,
            cursor_offset,
            candidate: previous,
        } = self.state
        else {
            return self.noop(DragNoopReason::IdleWithoutActiveDrag);
        };
        if active_pointer != pointer_id {
            return self.noop(DragNoopReason::PointerMismatch);
        }
        if !cursor.is_finite() {
            return self.noop(DragNoopReason::InvalidPointerPosition);
        }
        let Some(is_operator) = forest.node(node).map(|n| n.is_operator()) else {
            return self.abandon(forest, previous, DragNoopReason::DraggedNodeMissing);
        };
        if forest.parent_of(node).is_some() {
            return self.abandon(forest, previous, DragNoopReason::DraggedNodeNested);
        }

        // Search against the links as they stand before the node moves.
        let candidate = if is_operator {
            forest
                .nearest_free_socket(node, cursor, self.config.capture_radius)
                .map(|found| found.socket)
        } else {
            None
        };

        let target = cursor.translate(cursor_offset);
        if forest.set_position(node, target).is_err() {
            tracing::debug!(target: LOG_TARGET, node = %node, "drag position reset to origin");
        }
        let position = forest.node(node).map_or(Point::ORIGIN, |n| n.position());
        forest.host_mut().bring_to_front(node);
        if candidate != previous {
            forest.host_mut().highlight_socket(candidate);
        }

        tracing::trace!(
            target: LOG_TARGET,
            node = %node,
            x = position.x,
            y = position.y,
            candidate = ?candidate,
            "drag moved"
        );
        self.transition(
            DragState::Armed {
                node,
                pointer_id,
                button,
                cursor_offset,
                candidate,
            },
            DragEffect::Moved {
                node,
                position,
                candidate,
            },
        )
    }

    /// Release the node: attach into the candidate socket if there is one.
    ///
    /// The session ends whether or not an attach happened.
    pub fn pointer_up<H: VisualLayer>(
        &mut self,
        forest: &mut Forest<H>,
        pointer_id: u32,
        button: PointerButton,
    ) -> DragTransition {
        let DragState::Armed {
            node,
            pointer_id: active_pointer,
            button: active_button,
            candidate,
            ..
        } = self.state
        else {
            return self.noop(DragNoopReason::IdleWithoutActiveDrag);
        };
        if active_pointer != pointer_id {
            return self.noop(DragNoopReason::PointerMismatch);
        }
        if active_button != button {
            return self.noop(DragNoopReason::ButtonMismatch);
        }
        if !forest.contains(node) {
            return self.abandon(forest, candidate, DragNoopReason::DraggedNodeMissing);
        }
        if forest.parent_of(node).is_some() {
            return self.abandon(forest, candidate, DragNoopReason::DraggedNodeNested);
        }

        if candidate.is_some() {
            forest.host_mut().highlight_socket(None);
        }
        let attached = candidate.and_then(|socket| {
            match forest.attach_child(socket.owner, node, socket.side) {
                Ok(()) => Some(socket),
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, node = %node, code = err.code(), "{err}");
                    None
                }
            }
        });

        let effect = match attached {
            Some(socket) => {
                tracing::debug!(target: LOG_TARGET, node = %node, socket = %socket, "drag attached");
                DragEffect::Attached { node, socket }
            }
            None => {
                let position = forest.node(node).map_or(Point::ORIGIN, |n| n.position());
                tracing::debug!(target: LOG_TARGET, node = %node, "drag dropped as root");
                DragEffect::Dropped { node, position }
            }
        };
        self.transition(DragState::Idle, effect)
    }

    /// End the gesture without attaching; the node stays where it is.
    pub fn pointer_cancel<H: VisualLayer>(
        &mut self,
        forest: &mut Forest<H>,
        pointer_id: u32,
    ) -> DragTransition {
        match self.state {
            DragState::Idle => self.noop(DragNoopReason::IdleWithoutActiveDrag),
            DragState::Armed {
                pointer_id: active, ..
            } if active != pointer_id => self.noop(DragNoopReason::PointerMismatch),
            DragState::Armed { .. } => self.cancel(forest),
        }
    }

    /// Cancel whatever gesture is active regardless of pointer.
    ///
    /// Returns `None` when idle.
    pub fn force_cancel<H: VisualLayer>(&mut self, forest: &mut Forest<H>) -> Option<DragTransition> {
        self.state.is_active().then(|| self.cancel(forest))
    }

    fn cancel<H: VisualLayer>(&mut self, forest: &mut Forest<H>) -> DragTransition {
        let DragState::Armed {
            node, candidate, ..
        } = self.state
        else {
            return self.noop(DragNoopReason::IdleWithoutActiveDrag);
        };
        if candidate.is_some() {
            forest.host_mut().highlight_socket(None);
        }
        let position = forest.node(node).map_or(Point::ORIGIN, |n| n.position());
        tracing::debug!(target: LOG_TARGET, node = %node, "drag canceled");
        self.transition(DragState::Idle, DragEffect::Canceled { node, position })
    }

    /// Forget the drop candidate without ending the gesture.
    ///
    /// For hosts that edit the forest mid-drag: the next pointer-move searches
    /// again. Returns the socket that was dropped, if any.
    pub fn clear_candidate<H: VisualLayer>(&mut self, forest: &mut Forest<H>) -> Option<Socket> {
        let DragState::Armed { candidate, .. } = &mut self.state else {
            return None;
        };
        let cleared = candidate.take()?;
        forest.host_mut().highlight_socket(None);
        tracing::debug!(target: LOG_TARGET, socket = %cleared, "drag candidate cleared");
        Some(cleared)
    }

    /// The dragged node is gone or no longer a root: clear decorations and go
    /// idle without touching it.
    fn abandon<H: VisualLayer>(
        &mut self,
        forest: &mut Forest<H>,
        candidate: Option<Socket>,
        reason: DragNoopReason,
    ) -> DragTransition {
        if candidate.is_some() {
            forest.host_mut().highlight_socket(None);
        }
        tracing::warn!(target: LOG_TARGET, reason = ?reason, "drag session ended");
        self.transition(DragState::Idle, DragEffect::Noop { reason })
    }

    fn noop(&mut self, reason: DragNoopReason) -> DragTransition {
        tracing::debug!(target: LOG_TARGET, reason = ?reason, "pointer event ignored");
        self.transition(self.state, DragEffect::Noop { reason })
    }

    fn transition(&mut self, to: DragState, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let from = self.state;
        self.state = to;
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to,
            effect,
        }
    }
}

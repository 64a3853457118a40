#![forbid(unsafe_code)]

//! One editing surface: a forest, its visual host, and the drag gesture in
//! progress on it.

use brickyard_core::Point;
use brickyard_drag::{DragSession, DragTransition, PointerButton};
use brickyard_forest::{
    Forest, ForestSnapshot, Node, NodeId, NodeKind, OperatorKind, Side, VisualLayer,
};

use crate::config::{ConfigError, EditorConfig};
use crate::Result;

const LOG_TARGET: &str = "brickyard.editor";

/// Editing surface bound to a visual host `H`.
#[derive(Debug)]
pub struct Editor<H> {
    forest: Forest<H>,
    drag: DragSession,
}

impl<H: VisualLayer> Editor<H> {
    /// Create an empty editor, rejecting invalid configuration.
    pub fn new(host: H, config: &EditorConfig) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors).into());
        }
        let drag = DragSession::new(config.drag)
            .map_err(|e| ConfigError::Validation(vec![e.to_string()]))?;
        Ok(Self {
            forest: Forest::new(host),
            drag,
        })
    }

    /// Create an empty editor with the default configuration.
    #[must_use]
    pub fn with_defaults(host: H) -> Self {
        Self {
            forest: Forest::new(host),
            drag: DragSession::default(),
        }
    }

    #[must_use]
    pub fn forest(&self) -> &Forest<H> {
        &self.forest
    }

    #[must_use]
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    #[must_use]
    pub fn host(&self) -> &H {
        self.forest.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.forest.host_mut()
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.forest.into_host()
    }

    /// Add a node as a new root.
    pub fn spawn(&mut self, kind: impl Into<NodeKind>, position: Point) -> Result<NodeId> {
        Ok(self.forest.spawn(kind, position)?)
    }

    /// Add an operator by name (`"and"`, `"OR"`, ...).
    pub fn spawn_operator(&mut self, name: &str, position: Point) -> Result<NodeId> {
        let op: OperatorKind = name.parse()?;
        self.spawn(op, position)
    }

    /// Remove a node, ending any drag that holds it.
    ///
    /// A drop candidate on one of the node's sockets is cleared.
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        if self.drag.dragged_node() == Some(id) {
            self.cancel_drag("removed");
        }
        let node = self.forest.remove(id)?;
        self.reconcile_drag();
        Ok(node)
    }

    /// Nest `child` under `parent`. A drag holding `child` is canceled.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId, side: Side) -> Result<()> {
        self.forest.attach_child(parent, child, side)?;
        self.reconcile_drag();
        Ok(())
    }

    /// Child-initiated form of [`Editor::attach_child`].
    pub fn attach_parent(&mut self, child: NodeId, parent: NodeId, side: Side) -> Result<()> {
        self.forest.attach_parent(child, parent, side)?;
        self.reconcile_drag();
        Ok(())
    }

    pub fn detach_child(&mut self, parent: NodeId, side: Side) -> Result<NodeId> {
        Ok(self.forest.detach_child(parent, side)?)
    }

    pub fn detach_parent(&mut self, child: NodeId) -> Result<NodeId> {
        Ok(self.forest.detach_parent(child)?)
    }

    pub fn pointer_down(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        cursor: Point,
    ) -> DragTransition {
        self.drag
            .pointer_down(&mut self.forest, pointer_id, button, cursor)
    }

    pub fn pointer_move(&mut self, pointer_id: u32, cursor: Point) -> DragTransition {
        self.drag.pointer_move(&mut self.forest, pointer_id, cursor)
    }

    pub fn pointer_up(&mut self, pointer_id: u32, button: PointerButton) -> DragTransition {
        self.drag.pointer_up(&mut self.forest, pointer_id, button)
    }

    pub fn pointer_cancel(&mut self, pointer_id: u32) -> DragTransition {
        self.drag.pointer_cancel(&mut self.forest, pointer_id)
    }

    /// Bring the gesture in line with an edit made outside it: a dragged
    /// node that is gone or nested ends the drag, and a candidate socket that
    /// is gone or occupied is forgotten.
    fn reconcile_drag(&mut self) {
        if let Some(node) = self.drag.dragged_node() {
            if !self.forest.contains(node) {
                self.cancel_drag("removed");
                return;
            }
            if self.forest.parent_of(node).is_some() {
                self.cancel_drag("nested");
                return;
            }
        }
        if let Some(socket) = self.drag.candidate() {
            let free = self
                .forest
                .node(socket.owner)
                .is_some_and(|owner| !owner.has_child(socket.side));
            if !free {
                let _ = self.drag.clear_candidate(&mut self.forest);
            }
        }
    }

    fn cancel_drag(&mut self, cause: &'static str) {
        if let Some(transition) = self.drag.force_cancel(&mut self.forest) {
            tracing::debug!(
                target: LOG_TARGET,
                cause,
                transition_id = transition.transition_id,
                effect = ?transition.effect,
                "drag canceled by edit"
            );
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ForestSnapshot {
        self.forest.snapshot()
    }

    /// One line per node, for debug output.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        self.forest.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use brickyard_forest::{ForestError, HeadlessLayer};

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = EditorConfig::default();
        config.drag.capture_radius = 0.0;
        let err = Editor::new(HeadlessLayer, &config).expect_err("radius 0");
        assert!(matches!(err, Error::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn operators_spawn_by_name() {
        let mut editor = Editor::with_defaults(HeadlessLayer);
        let id = editor
            .spawn_operator(" Not ", Point::new(3.0, 4.0))
            .expect("known operator");
        assert_eq!(
            editor.forest().node(id).map(|n| n.kind()),
            Some(NodeKind::Operator(OperatorKind::Not))
        );
        let err = editor
            .spawn_operator("nand", Point::ORIGIN)
            .expect_err("unknown operator");
        assert!(matches!(
            err,
            Error::Forest(ForestError::UnknownOperator { ref name }) if name == "nand"
        ));
        assert_eq!(editor.forest().len(), 1);
    }
}

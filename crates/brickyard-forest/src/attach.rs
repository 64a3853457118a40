//! Attachment protocol.
//!
//! Either end of a link may initiate it: `attach_child` is the parent asking
//! for a child, `attach_parent` is the child asking for a parent. Both go
//! through one transaction ([`Forest::link`]) that validates everything
//! before touching either node and then writes both halves of the link
//! together. Teardown is symmetric through [`Forest::unlink`].
//!
//! A rejected call leaves the forest untouched, logs a warning, and returns
//! the reason.

use brickyard_core::Point;

use crate::forest::LOG_TARGET;
use crate::{Forest, ForestError, NodeId, ParentLink, Side, Socket, VisualLayer};

impl<H: VisualLayer> Forest<H> {
    /// Put `child` into `parent`'s `side` socket.
    ///
    /// On success the child's stored position resets to the origin and its
    /// handle is nested inside the parent's socket.
    ///
    /// # Errors
    ///
    /// Checked in order: [`ForestError::MissingNode`],
    /// [`ForestError::SelfAttachment`], [`ForestError::NotAnOperator`],
    /// [`ForestError::SocketOccupied`], [`ForestError::AlreadyHasParent`],
    /// [`ForestError::AncestorConflict`].
    pub fn attach_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        side: Side,
    ) -> Result<(), ForestError> {
        self.link(parent, side, child)
    }

    /// Mirror of [`Forest::attach_child`] initiated by the child.
    pub fn attach_parent(
        &mut self,
        child: NodeId,
        parent: NodeId,
        side: Side,
    ) -> Result<(), ForestError> {
        self.link(parent, side, child)
    }

    /// Remove whatever child occupies `parent`'s `side` socket and return it.
    ///
    /// The child becomes a root at its last rendered on-screen location.
    pub fn detach_child(&mut self, parent: NodeId, side: Side) -> Result<NodeId, ForestError> {
        self.unlink(parent, side)
    }

    /// Detach `child` from its parent and return the former parent.
    pub fn detach_parent(&mut self, child: NodeId) -> Result<NodeId, ForestError> {
        let link = match self.require(child) {
            Ok(node) => node.parent(),
            Err(err) => return Err(reject(err)),
        };
        let Some(link) = link else {
            return Err(reject(ForestError::NoParentToDetach { node_id: child }));
        };
        self.unlink(link.parent, link.side)?;
        Ok(link.parent)
    }

    fn check_link(&self, parent: NodeId, side: Side, child: NodeId) -> Result<(), ForestError> {
        let parent_node = self.require(parent)?;
        let child_node = self.require(child)?;
        if parent == child {
            return Err(ForestError::SelfAttachment { node_id: child });
        }
        if !parent_node.is_operator() {
            return Err(ForestError::NotAnOperator { node_id: parent });
        }
        if !child_node.is_operator() {
            return Err(ForestError::NotAnOperator { node_id: child });
        }
        if let Some(occupant) = parent_node.children().get(side) {
            return Err(ForestError::SocketOccupied {
                socket: Socket::new(parent, side),
                occupant,
            });
        }
        if let Some(existing) = child_node.parent() {
            return Err(ForestError::AlreadyHasParent {
                child,
                parent: existing.parent,
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(ForestError::AncestorConflict {
                ancestor: child,
                descendant: parent,
            });
        }
        Ok(())
    }

    /// Single attach transaction: validate, then write both link halves.
    pub(crate) fn link(
        &mut self,
        parent: NodeId,
        side: Side,
        child: NodeId,
    ) -> Result<(), ForestError> {
        self.check_link(parent, side, child).map_err(reject)?;

        self.require_mut(parent)?.set_child(side, Some(child));
        let child_node = self.require_mut(child)?;
        child_node.set_parent(Some(ParentLink { parent, side }));
        // Nested nodes are laid out by their parent.
        let _ = child_node.set_position(Point::ORIGIN);

        self.host.nest_under(parent, side, child);
        tracing::debug!(
            target: LOG_TARGET,
            parent = %parent,
            side = side.name(),
            child = %child,
            "attached"
        );
        self.structural_change();
        Ok(())
    }

    /// Single detach transaction: clear both link halves and hand the child
    /// back to independent layout at its rendered location.
    pub(crate) fn unlink(&mut self, parent: NodeId, side: Side) -> Result<NodeId, ForestError> {
        let occupant = match self.require(parent) {
            Ok(node) => node.children().get(side),
            Err(err) => return Err(reject(err)),
        };
        let Some(child) = occupant else {
            return Err(reject(ForestError::NoSuchChildToDetach {
                socket: Socket::new(parent, side),
            }));
        };

        // Ask for the rendered location while the handle is still nested.
        let origin = self
            .host
            .visual_origin(child)
            .filter(|point| point.is_finite())
            .unwrap_or(Point::ORIGIN);

        self.require_mut(parent)?.set_child(side, None);
        let child_node = self.require_mut(child)?;
        child_node.set_parent(None);
        let _ = child_node.set_position(origin);

        self.host.restore_independent_layout(child);
        self.host.place(child, origin);
        self.host.bring_to_front(child);
        tracing::debug!(
            target: LOG_TARGET,
            parent = %parent,
            side = side.name(),
            child = %child,
            x = origin.x,
            y = origin.y,
            "detached"
        );
        self.structural_change();
        Ok(child)
    }
}

fn reject(err: ForestError) -> ForestError {
    tracing::warn!(target: LOG_TARGET, code = err.code(), "{err}");
    err
}

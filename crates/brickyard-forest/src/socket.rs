//! Nearest free socket search used while a node is being dragged.

use brickyard_core::Point;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{Forest, NodeId, Socket, VisualLayer};

/// Default capture radius in pixels.
pub const SOCKET_CAPTURE_RADIUS: f64 = 64.0;

/// A socket within reach of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocketCandidate {
    pub socket: Socket,
    /// Rendered center the distance was measured to.
    pub center: Point,
    pub distance: f64,
}

impl SocketCandidate {
    /// Deterministic preference: closer first, then lower owner ID, then left
    /// before right.
    fn beats(&self, other: &Self) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && self.socket < other.socket)
    }
}

/// Pick the socket whose center is closest to `cursor`, within `radius`
/// inclusive.
///
/// Candidates with a non-finite center are skipped. A non-finite cursor or a
/// negative/non-finite radius finds nothing.
#[must_use]
pub fn nearest_socket<I>(cursor: Point, candidates: I, radius: f64) -> Option<SocketCandidate>
where
    I: IntoIterator<Item = (Socket, Point)>,
{
    if !cursor.is_finite() || !radius.is_finite() || radius < 0.0 {
        return None;
    }
    let mut best: Option<SocketCandidate> = None;
    for (socket, center) in candidates {
        if !center.is_finite() {
            continue;
        }
        let distance = cursor.distance(center);
        if distance > radius {
            continue;
        }
        let candidate = SocketCandidate {
            socket,
            center,
            distance,
        };
        match best {
            Some(current) if !candidate.beats(&current) => {}
            _ => best = Some(candidate),
        }
    }
    best
}

impl<H: VisualLayer> Forest<H> {
    /// Free sockets a dragged node may drop into.
    ///
    /// Recomputed from the links rather than the cached view, minus every
    /// socket owned by `dragged` or one of its descendants.
    #[must_use]
    pub fn candidate_sockets(&self, dragged: NodeId) -> Vec<Socket> {
        let excluded: FxHashSet<NodeId> = self.subtree(dragged).into_iter().collect();
        self.derive_views()
            .free_sockets
            .into_iter()
            .filter(|socket| !excluded.contains(&socket.owner))
            .collect()
    }

    /// Nearest candidate socket for `dragged` around `cursor`, measured
    /// against the visual layer's rendered socket centers.
    #[must_use]
    pub fn nearest_free_socket(
        &self,
        dragged: NodeId,
        cursor: Point,
        radius: f64,
    ) -> Option<SocketCandidate> {
        let centers = self
            .candidate_sockets(dragged)
            .into_iter()
            .filter_map(|socket| {
                self.host
                    .visual_center(socket)
                    .map(|center| (socket, center))
            });
        nearest_socket(cursor, centers, radius)
    }
}

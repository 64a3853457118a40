//! End-to-end drag gestures against the in-memory scene.

use brickyard_core::Point;
use brickyard_drag::{
    DragConfig, DragEffect, DragNoopReason, DragSession, DragState, PointerButton,
};
use brickyard_forest::{Forest, NodeId, NodeKind, OperatorKind, Side, Socket, VisualLayer};
use brickyard_harness::{LayerCommand, SceneLayer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const POINTER: u32 = 1;

fn scene() -> Forest<SceneLayer> {
    Forest::new(SceneLayer::new())
}

fn session() -> DragSession {
    DragSession::new(DragConfig::default()).expect("default config should be valid")
}

fn socket_center(forest: &Forest<SceneLayer>, owner: NodeId, side: Side) -> Point {
    forest
        .host()
        .visual_center(Socket::new(owner, side))
        .expect("socket is rendered")
}

/// X at (100, 100) with Y nested in its left socket.
fn nested_pair() -> (Forest<SceneLayer>, NodeId, NodeId) {
    let mut forest = scene();
    let x = forest
        .spawn(OperatorKind::And, Point::new(100.0, 100.0))
        .expect("x");
    let y = forest
        .spawn(OperatorKind::Or, Point::new(500.0, 400.0))
        .expect("y");
    forest.attach_child(x, y, Side::Left).expect("x<-y");
    (forest, x, y)
}

#[test]
fn grabbing_a_nested_node_detaches_it_and_dropping_near_socket_reattaches() {
    let (mut forest, x, y) = nested_pair();
    let mut drag = session();
    assert_eq!(forest.roots(), &[x]);

    // Y's handle now sits at X's left slot: (108, 124).
    let down = drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(120.0, 130.0));
    assert!(matches!(
        down.effect,
        DragEffect::Armed { node, detached_from: Some(parent), .. } if node == y && parent == x
    ));
    assert_eq!(forest.roots(), &[x, y]);
    assert_eq!(forest.node(y).map(|n| n.position()), Some(Point::new(108.0, 124.0)));

    let target = socket_center(&forest, x, Side::Left);
    let moved = drag.pointer_move(&mut forest, POINTER, Point::new(target.x + 20.0, target.y + 10.0));
    assert!(matches!(
        moved.effect,
        DragEffect::Moved { candidate: Some(socket), .. } if socket == Socket::new(x, Side::Left)
    ));
    assert_eq!(forest.host().highlighted(), Some(Socket::new(x, Side::Left)));

    let up = drag.pointer_up(&mut forest, POINTER, PointerButton::Primary);
    assert_eq!(
        up.effect,
        DragEffect::Attached {
            node: y,
            socket: Socket::new(x, Side::Left)
        }
    );
    assert_eq!(up.to, DragState::Idle);
    assert_eq!(forest.roots(), &[x]);
    assert_eq!(forest.host().highlighted(), None);
    assert!(forest.validate().is_ok());
}

#[test]
fn dragged_subtree_never_offers_its_own_sockets() {
    let mut forest = scene();
    let a = forest
        .spawn(OperatorKind::And, Point::new(100.0, 100.0))
        .expect("a");
    let b = forest
        .spawn(OperatorKind::Or, Point::new(0.0, 0.0))
        .expect("b");
    let far = forest
        .spawn(OperatorKind::Not, Point::new(900.0, 900.0))
        .expect("far");
    forest.attach_child(a, b, Side::Left).expect("a<-b");
    let mut drag = session();

    // Grab A by its right half, away from the nested B.
    let down = drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(250.0, 110.0));
    assert!(matches!(down.effect, DragEffect::Armed { node, detached_from: None, .. } if node == a));

    for side in [Side::Left, Side::Right] {
        let over_descendant = socket_center(&forest, b, side);
        let moved = drag.pointer_move(&mut forest, POINTER, over_descendant);
        assert!(
            matches!(moved.effect, DragEffect::Moved { candidate: None, .. }),
            "{moved:?}"
        );
        // Moving A moved B with it; re-aim on the next iteration.
    }

    let over_own = socket_center(&forest, a, Side::Right);
    let moved = drag.pointer_move(&mut forest, POINTER, over_own);
    assert!(matches!(moved.effect, DragEffect::Moved { candidate: None, .. }));

    let up = drag.pointer_up(&mut forest, POINTER, PointerButton::Primary);
    assert!(matches!(up.effect, DragEffect::Dropped { node, .. } if node == a));
    assert_eq!(forest.roots(), &[a, far]);
    assert_eq!(forest.parent_of(b).map(|link| link.parent), Some(a));
}

#[test]
fn dropping_outside_radius_leaves_a_root_where_released() {
    let mut forest = scene();
    let x = forest
        .spawn(OperatorKind::And, Point::new(100.0, 100.0))
        .expect("x");
    let y = forest
        .spawn(OperatorKind::Or, Point::new(600.0, 100.0))
        .expect("y");
    let mut drag = session();

    drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(610.0, 110.0));
    let left = socket_center(&forest, x, Side::Left);
    // Just past the inclusive 64px boundary.
    let cursor = Point::new(left.x, left.y + 64.5);
    let moved = drag.pointer_move(&mut forest, POINTER, cursor);
    assert!(matches!(moved.effect, DragEffect::Moved { candidate: None, .. }));

    let up = drag.pointer_up(&mut forest, POINTER, PointerButton::Primary);
    let expected = Point::new(cursor.x - 10.0, cursor.y - 10.0);
    assert_eq!(up.effect, DragEffect::Dropped { node: y, position: expected });
    assert_eq!(forest.roots(), &[x, y]);
    assert_eq!(forest.node(y).map(|n| n.position()), Some(expected));
}

#[test]
fn capture_radius_boundary_is_inclusive() {
    let mut forest = scene();
    let x = forest
        .spawn(OperatorKind::And, Point::new(100.0, 100.0))
        .expect("x");
    let y = forest
        .spawn(OperatorKind::Or, Point::new(600.0, 100.0))
        .expect("y");
    let mut drag = session();

    drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(610.0, 110.0));
    let left = socket_center(&forest, x, Side::Left);
    let moved = drag.pointer_move(&mut forest, POINTER, Point::new(left.x, left.y + 64.0));
    assert!(matches!(
        moved.effect,
        DragEffect::Moved { candidate: Some(socket), .. } if socket == Socket::new(x, Side::Left)
    ));
    drag.pointer_up(&mut forest, POINTER, PointerButton::Primary);
    assert_eq!(forest.parent_of(y).map(|link| link.socket()), Some(Socket::new(x, Side::Left)));
}

#[test]
fn placeholders_drag_but_never_snap() {
    let mut forest = scene();
    let x = forest
        .spawn(OperatorKind::And, Point::new(100.0, 100.0))
        .expect("x");
    let ph = forest
        .spawn(NodeKind::Placeholder, Point::new(600.0, 100.0))
        .expect("placeholder");
    let mut drag = session();

    drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(600.0, 100.0));
    let target = socket_center(&forest, x, Side::Right);
    let moved = drag.pointer_move(&mut forest, POINTER, target);
    assert!(matches!(moved.effect, DragEffect::Moved { node, candidate: None, .. } if node == ph));
    let up = drag.pointer_up(&mut forest, POINTER, PointerButton::Primary);
    assert!(matches!(up.effect, DragEffect::Dropped { .. }));
    assert!(!forest.has_child(x, Side::Right));
}

#[test]
fn highlight_is_sent_only_when_candidate_changes() {
    let mut forest = scene();
    let x = forest
        .spawn(OperatorKind::And, Point::new(100.0, 100.0))
        .expect("x");
    forest
        .spawn(OperatorKind::Or, Point::new(600.0, 100.0))
        .expect("y");
    let mut drag = session();

    drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(610.0, 110.0));
    let _ = forest.host_mut().take_commands();
    let left = socket_center(&forest, x, Side::Left);
    for dx in [0.0, 2.0, 4.0] {
        drag.pointer_move(&mut forest, POINTER, Point::new(left.x + dx, left.y));
    }
    drag.pointer_move(&mut forest, POINTER, Point::new(2000.0, 2000.0));

    let highlights: Vec<Option<Socket>> = forest
        .host()
        .commands()
        .iter()
        .filter_map(|command| match command {
            LayerCommand::Highlight { socket } => Some(*socket),
            _ => None,
        })
        .collect();
    assert_eq!(highlights, vec![Some(Socket::new(x, Side::Left)), None]);
}

#[test]
fn foreign_pointer_and_button_are_ignored_mid_drag() {
    let (mut forest, x, y) = nested_pair();
    let mut drag = session();

    let secondary = drag.pointer_down(&mut forest, POINTER, PointerButton::Secondary, Point::new(120.0, 130.0));
    assert_eq!(
        secondary.effect,
        DragEffect::Noop {
            reason: DragNoopReason::ButtonNotAllowed
        }
    );
    assert_eq!(forest.roots(), &[x], "ignored grab must not detach");

    drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(120.0, 130.0));
    let stray = drag.pointer_move(&mut forest, 2, Point::new(900.0, 900.0));
    assert_eq!(
        stray.effect,
        DragEffect::Noop {
            reason: DragNoopReason::PointerMismatch
        }
    );
    assert_eq!(forest.node(y).map(|n| n.position()), Some(Point::new(108.0, 124.0)));

    let wrong_button = drag.pointer_up(&mut forest, POINTER, PointerButton::Middle);
    assert_eq!(
        wrong_button.effect,
        DragEffect::Noop {
            reason: DragNoopReason::ButtonMismatch
        }
    );
    assert!(drag.is_active());
}

#[test]
fn cancel_keeps_node_where_it_is() {
    let (mut forest, x, y) = nested_pair();
    let mut drag = session();

    drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(120.0, 130.0));
    let left = socket_center(&forest, x, Side::Left);
    drag.pointer_move(&mut forest, POINTER, left);
    assert!(drag.candidate().is_some());

    let canceled = drag.pointer_cancel(&mut forest, POINTER);
    assert!(matches!(canceled.effect, DragEffect::Canceled { node, .. } if node == y));
    assert_eq!(forest.roots(), &[x, y], "cancel never attaches");
    assert_eq!(forest.host().highlighted(), None);
    assert_eq!(drag.dragged_node(), None);
}

#[derive(Debug, Clone)]
enum Gesture {
    Down(f64, f64),
    Move(f64, f64),
    Up,
    Cancel,
}

fn gesture() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        (0.0f64..900.0, 0.0f64..600.0).prop_map(|(x, y)| Gesture::Down(x, y)),
        (0.0f64..900.0, 0.0f64..600.0).prop_map(|(x, y)| Gesture::Move(x, y)),
        (0.0f64..900.0, 0.0f64..600.0).prop_map(|(x, y)| Gesture::Move(x, y)),
        Just(Gesture::Up),
        Just(Gesture::Cancel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_gestures_preserve_forest_invariants(gestures in prop::collection::vec(gesture(), 1..60)) {
        let mut forest = scene();
        for (index, kind) in OperatorKind::ALL.iter().cycle().take(6).enumerate() {
            let col = (index % 3) as f64;
            let row = (index / 3) as f64;
            forest
                .spawn(*kind, Point::new(40.0 + col * 280.0, 60.0 + row * 240.0))
                .expect("spawn");
        }
        let mut drag = session();

        for gesture in gestures {
            let transition = match gesture {
                Gesture::Down(x, y) => drag.pointer_down(&mut forest, POINTER, PointerButton::Primary, Point::new(x, y)),
                Gesture::Move(x, y) => drag.pointer_move(&mut forest, POINTER, Point::new(x, y)),
                Gesture::Up => drag.pointer_up(&mut forest, POINTER, PointerButton::Primary),
                Gesture::Cancel => drag.pointer_cancel(&mut forest, POINTER),
            };
            prop_assert!(forest.validate().is_ok(), "{:?}", forest.invariant_report().issues);
            prop_assert_eq!(forest.derive_views(), forest.views().clone());
            if let DragState::Armed { node, .. } = transition.to {
                prop_assert!(forest.node(node).is_some_and(|n| n.is_root()));
            }
            if !drag.is_active() {
                prop_assert_eq!(forest.host().highlighted(), None);
            }
        }
    }
}

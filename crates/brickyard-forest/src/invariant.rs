//! Structural invariant report.
//!
//! The attachment protocol keeps every link two-sided and the forest acyclic;
//! this module checks that claim from scratch so tests, fuzzers, and debug
//! builds can assert it after arbitrary operation sequences.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{Forest, NodeId, Side, Socket, VisualLayer};

/// Severity for one invariant finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForestInvariantSeverity {
    Error,
    Warning,
}

/// Stable code for invariant findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForestInvariantCode {
    /// A parent lists a child whose back-link points elsewhere.
    ChildParentMismatch,
    /// A child names a parent socket that does not hold it.
    ParentChildMismatch,
    MissingParent,
    MissingChild,
    SelfReferential,
    CycleDetected,
    /// The same node sits in more than one socket.
    MultipleParents,
    PlaceholderHasLinks,
    NextIdNotGreaterThanExisting,
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestInvariantIssue {
    pub code: ForestInvariantCode,
    pub severity: ForestInvariantSeverity,
    pub node_id: Option<NodeId>,
    pub related_node: Option<NodeId>,
    pub message: String,
}

/// All findings over one forest state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestInvariantReport {
    pub state_hash: u64,
    pub issues: Vec<ForestInvariantIssue>,
}

impl ForestInvariantReport {
    /// Return true if any error-level finding exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == ForestInvariantSeverity::Error)
    }

    /// Codes of every finding, in report order.
    #[must_use]
    pub fn codes(&self) -> Vec<ForestInvariantCode> {
        self.issues.iter().map(|issue| issue.code).collect()
    }
}

impl<H: VisualLayer> Forest<H> {
    /// Check mutuality, acyclicity, and exclusivity of every link.
    #[must_use]
    pub fn invariant_report(&self) -> ForestInvariantReport {
        let mut issues = Vec::new();

        if let Some(max_existing) = self.nodes.keys().next_back().copied()
            && self.next_id() <= max_existing
        {
            push_issue(
                &mut issues,
                ForestInvariantCode::NextIdNotGreaterThanExisting,
                ForestInvariantSeverity::Warning,
                Some(self.next_id()),
                Some(max_existing),
                format!(
                    "next_id {} must be greater than max node id {}",
                    self.next_id(),
                    max_existing
                ),
            );
        }

        let mut holders: BTreeMap<NodeId, Vec<Socket>> = BTreeMap::new();
        for node in self.nodes.values() {
            let id = node.id();

            let has_links = node.parent().is_some() || node.children().iter().next().is_some();
            if !node.is_operator() && has_links {
                push_issue(
                    &mut issues,
                    ForestInvariantCode::PlaceholderHasLinks,
                    ForestInvariantSeverity::Error,
                    Some(id),
                    None,
                    format!("placeholder {id} takes part in a link"),
                );
            }

            if let Some(link) = node.parent() {
                if link.parent == id {
                    push_issue(
                        &mut issues,
                        ForestInvariantCode::SelfReferential,
                        ForestInvariantSeverity::Error,
                        Some(id),
                        None,
                        format!("node {id} names itself as parent"),
                    );
                }
                match self.nodes.get(&link.parent) {
                    None => push_issue(
                        &mut issues,
                        ForestInvariantCode::MissingParent,
                        ForestInvariantSeverity::Error,
                        Some(id),
                        Some(link.parent),
                        format!("node {id} references missing parent {}", link.parent),
                    ),
                    Some(parent) if parent.children().get(link.side) != Some(id) => push_issue(
                        &mut issues,
                        ForestInvariantCode::ParentChildMismatch,
                        ForestInvariantSeverity::Error,
                        Some(id),
                        Some(link.parent),
                        format!(
                            "node {id} claims socket {} which does not hold it",
                            link.socket()
                        ),
                    ),
                    Some(_) => {}
                }
            }

            for (side, child) in node.children().iter() {
                holders
                    .entry(child)
                    .or_default()
                    .push(Socket::new(id, side));
                if child == id {
                    push_issue(
                        &mut issues,
                        ForestInvariantCode::SelfReferential,
                        ForestInvariantSeverity::Error,
                        Some(id),
                        None,
                        format!("node {id} holds itself in its {side} socket"),
                    );
                    continue;
                }
                check_child_back_link(self, &mut issues, id, side, child);
            }
        }

        for (child, sockets) in &holders {
            if sockets.len() > 1 {
                let listed = sockets
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                push_issue(
                    &mut issues,
                    ForestInvariantCode::MultipleParents,
                    ForestInvariantSeverity::Error,
                    Some(*child),
                    Some(sockets[0].owner),
                    format!("node {child} is held by sockets {listed}"),
                );
            }
        }

        check_cycles(self, &mut issues);

        ForestInvariantReport {
            state_hash: self.state_hash(),
            issues,
        }
    }

    /// `Ok(())` when the invariant report has no error-level finding.
    pub fn validate(&self) -> Result<(), ForestInvariantReport> {
        let report = self.invariant_report();
        if report.has_errors() {
            return Err(report);
        }
        Ok(())
    }
}

fn check_child_back_link<H: VisualLayer>(
    forest: &Forest<H>,
    issues: &mut Vec<ForestInvariantIssue>,
    parent: NodeId,
    side: Side,
    child: NodeId,
) {
    let Some(child_node) = forest.node(child) else {
        push_issue(
            issues,
            ForestInvariantCode::MissingChild,
            ForestInvariantSeverity::Error,
            Some(parent),
            Some(child),
            format!("node {parent} references missing {side} child {child}"),
        );
        return;
    };
    let back = child_node.parent();
    if back.map(|link| (link.parent, link.side)) != Some((parent, side)) {
        push_issue(
            issues,
            ForestInvariantCode::ChildParentMismatch,
            ForestInvariantSeverity::Error,
            Some(parent),
            Some(child),
            format!(
                "node {parent} holds {child} in its {side} socket but {child} points to {}",
                back.map_or_else(|| "no parent".to_string(), |link| link.socket().to_string())
            ),
        );
    }
}

fn check_cycles<H: VisualLayer>(forest: &Forest<H>, issues: &mut Vec<ForestInvariantIssue>) {
    let mut reported: FxHashSet<NodeId> = FxHashSet::default();
    for start in forest.nodes.keys().copied() {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut cursor = Some(start);
        while let Some(node_id) = cursor {
            if !seen.insert(node_id) {
                if reported.insert(node_id) {
                    push_issue(
                        issues,
                        ForestInvariantCode::CycleDetected,
                        ForestInvariantSeverity::Error,
                        Some(node_id),
                        Some(start),
                        format!("parent chain from {start} revisits {node_id}"),
                    );
                }
                break;
            }
            cursor = forest.parent_of(node_id).map(|link| link.parent);
        }
    }
}

fn push_issue(
    issues: &mut Vec<ForestInvariantIssue>,
    code: ForestInvariantCode,
    severity: ForestInvariantSeverity,
    node_id: Option<NodeId>,
    related_node: Option<NodeId>,
    message: String,
) {
    issues.push(ForestInvariantIssue {
        code,
        severity,
        node_id,
        related_node,
        message,
    });
}

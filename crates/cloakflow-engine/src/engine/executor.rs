//! Workflow graph executor.
//!
//! Readiness-driven (Kahn-style) traversal of one graph instance against one
//! live browser page. Merge nodes wait for every predecessor by deferred
//! retry; the first node failure aborts the whole traversal (fail-fast), and
//! nodes that never ran are reported as unreached.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use cloakflow_models::Graph;
use cloakflow_traits::BrowserPage;

use super::actions::execute_action;
use super::graph::ExecutionGraph;

const MERGE_NODE_TYPE: &str = "merge";

/// Outcome of one node: its action result or the error that stopped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    pub node_id: String,
    pub node_type: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate outcome of one traversal. `success` is true iff the error list
/// is empty; partial results up to a fail-fast abort are preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalReport {
    pub success: bool,
    pub results: Vec<NodeResult>,
    pub errors: Vec<String>,
}

/// Walk the graph, invoking the action executor per node.
///
/// Processing order: the ready queue is seeded with zero-in-edge nodes in
/// input order; beyond that no secondary ordering is guaranteed. A merge
/// node popped before all its predecessors ran is re-appended to the back of
/// the queue. A full cycle of the queue with nothing but deferrals proves
/// the remaining nodes can never become ready (malformed input), and the
/// traversal aborts instead of spinning.
pub async fn run_graph(page: &mut dyn BrowserPage, graph: &Graph) -> TraversalReport {
    let exec_graph = ExecutionGraph::new(graph);

    let mut results = Vec::new();
    let mut errors = Vec::new();

    if exec_graph.is_empty() {
        errors.push("workflow has no nodes".to_string());
        return TraversalReport {
            success: false,
            results,
            errors,
        };
    }

    let mut executed: HashSet<String> = HashSet::new();
    let mut ready: VecDeque<String> = exec_graph.entry_nodes().into();
    let mut deferrals = 0usize;

    while let Some(node_id) = ready.pop_front() {
        if executed.contains(&node_id) {
            continue;
        }
        let Some(node) = exec_graph.node(&node_id) else {
            continue;
        };

        // Merge nodes require every predecessor to have run; defer to the
        // back of the queue otherwise.
        if node.node_type == MERGE_NODE_TYPE
            && !all_executed(exec_graph.predecessors(&node_id), &executed)
        {
            ready.push_back(node_id.clone());
            deferrals += 1;
            if deferrals > ready.len() {
                warn!(node_id = %node_id, "Merge node can never become ready, aborting traversal");
                errors.push(format!(
                    "merge node {node_id} is waiting on predecessors that never complete"
                ));
                break;
            }
            continue;
        }
        deferrals = 0;

        let action = node.action().to_string();
        debug!(node_id = %node_id, node_type = %node.node_type, action = %action, "Executing node");

        match execute_action(page, &action, &node.data.config).await {
            Ok(value) => {
                results.push(NodeResult {
                    node_id: node_id.clone(),
                    node_type: node.node_type.clone(),
                    action,
                    result: Some(value),
                    error: None,
                });
                executed.insert(node_id.clone());

                for successor in exec_graph.successors(&node_id) {
                    if executed.contains(successor) {
                        continue;
                    }
                    // Merge successors are enqueued eagerly and synchronize
                    // at pop time via deferred retry; ordinary successors
                    // wait until every predecessor has run.
                    let is_merge = exec_graph
                        .node(successor)
                        .is_some_and(|n| n.node_type == MERGE_NODE_TYPE);
                    if is_merge || all_executed(exec_graph.predecessors(successor), &executed) {
                        ready.push_back(successor.clone());
                    }
                }
            }
            Err(err) => {
                errors.push(format!(
                    "action {action} failed on node {node_id}: {err}"
                ));
                results.push(NodeResult {
                    node_id: node_id.clone(),
                    node_type: node.node_type.clone(),
                    action,
                    result: None,
                    error: Some(err.to_string()),
                });
                executed.insert(node_id);
                // Fail-fast: nothing else runs, even disjoint branches.
                break;
            }
        }
    }

    let unreached: Vec<&str> = exec_graph
        .node_ids()
        .filter(|id| !executed.contains(*id))
        .collect();
    if !unreached.is_empty() {
        errors.push(format!("nodes never reached: {}", unreached.join(", ")));
    }

    TraversalReport {
        success: errors.is_empty(),
        results,
        errors,
    }
}

fn all_executed(ids: &[String], executed: &HashSet<String>) -> bool {
    ids.iter().all(|id| executed.contains(id))
}

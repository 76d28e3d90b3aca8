//! Task dependency management
//!
//! This module turns a requested task into an execution order: a depth-first
//! walk over prerequisites that rejects unknown tasks and cycles before
//! anything runs. Whole-graph validation uses petgraph's strongly connected
//! components to find every cycle at once.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::execution::graph::TaskGraph;
use crate::types::{KilnError, KilnResult};

/// Ordered list of tasks a run will visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub root: String,
    /// Prerequisites first, root last. Each task appears once.
    pub order: Vec<String>,
    chains: HashMap<String, Vec<String>>,
}

impl ExecutionPlan {
    /// Task names from the root down to `task`, along the path by which the
    /// planner first reached it.
    pub fn chain_to(&self, task: &str) -> Option<&[String]> {
        self.chains.get(task).map(Vec::as_slice)
    }

    pub fn contains(&self, task: &str) -> bool {
        self.chains.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Planner<'g, C> {
    graph: &'g TaskGraph<C>,
    marks: HashMap<String, Mark>,
    path: Vec<String>,
    order: Vec<String>,
    chains: HashMap<String, Vec<String>>,
}

impl<C> Planner<'_, C> {
    fn visit(&mut self, name: &str) -> KilnResult<()> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.path.iter().position(|n| n == name).unwrap_or(0);
                let mut cycle = self.path[start..].to_vec();
                cycle.push(name.to_string());
                return Err(KilnError::Cycle(cycle));
            }
            None => {}
        }

        let graph = self.graph;
        let task = graph
            .task(name)
            .ok_or_else(|| KilnError::TaskNotFound(name.to_string()))?;

        self.marks.insert(name.to_string(), Mark::InProgress);
        self.path.push(name.to_string());
        self.chains.insert(name.to_string(), self.path.clone());

        for dependency in task.dependencies() {
            if !graph.contains(dependency) {
                return Err(KilnError::MissingDependency {
                    task: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
            self.visit(dependency)?;
        }

        self.path.pop();
        self.marks.insert(name.to_string(), Mark::Done);
        self.order.push(name.to_string());
        Ok(())
    }
}

/// Resolve the execution order for `root` without evaluating any predicate
/// or action.
pub fn resolve_execution_plan<C>(graph: &TaskGraph<C>, root: &str) -> KilnResult<ExecutionPlan> {
    if !graph.contains(root) {
        return Err(KilnError::TaskNotFound(root.to_string()));
    }

    let mut planner = Planner {
        graph,
        marks: HashMap::new(),
        path: Vec::new(),
        order: Vec::new(),
        chains: HashMap::new(),
    };
    planner.visit(root)?;

    Ok(ExecutionPlan {
        root: root.to_string(),
        order: planner.order,
        chains: planner.chains,
    })
}

/// Every cycle in the graph, each as its sorted member names.
///
/// Edges to unregistered tasks are ignored here; [`validate_graph`] reports them.
pub fn dependency_cycles<C>(graph: &TaskGraph<C>) -> Vec<Vec<String>> {
    let mut dep_graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    for task in graph.tasks() {
        let node_index = dep_graph.add_node(task.name().to_string());
        node_indices.insert(task.name().to_string(), node_index);
    }

    for task in graph.tasks() {
        let from_node = node_indices[task.name()];
        for dependency in task.dependencies() {
            if let Some(&to_node) = node_indices.get(dependency) {
                dep_graph.add_edge(from_node, to_node, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = kosaraju_scc(&dep_graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| dep_graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if dep_graph.contains_edge(node, node) {
                    Some(vec![dep_graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

/// Check the whole graph: every prerequisite is registered and no task
/// depends on itself, directly or transitively.
pub fn validate_graph<C>(graph: &TaskGraph<C>) -> KilnResult<()> {
    for task in graph.tasks() {
        if let Some(missing) = task.dependencies().iter().find(|d| !graph.contains(d)) {
            return Err(KilnError::MissingDependency {
                task: task.name().to_string(),
                dependency: missing.clone(),
            });
        }
    }

    if let Some(cycle) = dependency_cycles(graph).into_iter().next() {
        // Re-plan from a cycle member to report the actual path.
        return match resolve_execution_plan(graph, &cycle[0]) {
            Err(err) => Err(err),
            Ok(_) => {
                let mut path = cycle.clone();
                path.push(cycle[0].clone());
                Err(KilnError::Cycle(path))
            }
        };
    }

    Ok(())
}

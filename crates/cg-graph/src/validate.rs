//! Whole-graph consistency checks.

use std::collections::{HashMap, VecDeque};

use cg_core::{CgError, CgResult, Slot};

use crate::graph::CitationGraph;
use crate::publication::Publication;

/// Audit every graph invariant: index/arena agreement, root shape, edge
/// mirroring, reachability, acyclicity. Returns the first violation.
pub(crate) fn check<P: Publication>(graph: &CitationGraph<P>) -> CgResult<()> {
    check_index(graph)?;
    check_edges(graph)?;
    check_reachability(graph)?;
    check_acyclic(graph)?;
    Ok(())
}

/// The index and the arena must describe the same set of nodes, and the
/// root entry must agree with the cached root slot and identity.
fn check_index<P: Publication>(graph: &CitationGraph<P>) -> CgResult<()> {
    match graph.index.get(&graph.root_id) {
        Some(&slot) if slot == graph.root => {}
        _ => {
            return Err(CgError::Invariant {
                what: "root identity must index the root slot",
            });
        }
    }

    if graph.index.len() != graph.arena.len() {
        return Err(CgError::Invariant {
            what: "index entries and live arena slots must correspond",
        });
    }

    for (id, &slot) in &graph.index {
        let Some(node) = graph.arena.get(slot) else {
            return Err(CgError::Invariant {
                what: "indexed slot must be live",
            });
        };
        if node.id() != *id {
            return Err(CgError::Invariant {
                what: "indexed slot must hold the publication it is keyed by",
            });
        }
    }

    Ok(())
}

/// Every edge must be mirrored, point at a live slot, and the root must
/// be the unique parentless node.
fn check_edges<P: Publication>(graph: &CitationGraph<P>) -> CgResult<()> {
    for (slot, node) in graph.arena.iter() {
        if slot == graph.root {
            if !node.parents().is_empty() {
                return Err(CgError::Invariant {
                    what: "root must have no parents",
                });
            }
        } else if node.parents().is_empty() {
            return Err(CgError::Invariant {
                what: "non-root node must cite at least one publication",
            });
        }

        for &child in node.children() {
            let Some(child_node) = graph.arena.get(child) else {
                return Err(CgError::Invariant {
                    what: "child edge must point at a live slot",
                });
            };
            if !child_node.parents().contains(&slot) {
                return Err(CgError::Invariant {
                    what: "child edge must be mirrored by a parent edge",
                });
            }
        }

        for &parent in node.parents() {
            let Some(parent_node) = graph.arena.get(parent) else {
                return Err(CgError::Invariant {
                    what: "parent edge must point at a live slot",
                });
            };
            if !parent_node.children().contains(&slot) {
                return Err(CgError::Invariant {
                    what: "parent edge must be mirrored by a child edge",
                });
            }
        }
    }

    Ok(())
}

/// Every indexed publication must be reachable from the root via child
/// edges.
fn check_reachability<P: Publication>(graph: &CitationGraph<P>) -> CgResult<()> {
    let reachable = graph.mark_reachable();
    for &slot in graph.index.values() {
        if !reachable.contains(&slot) {
            return Err(CgError::Invariant {
                what: "indexed publication must be reachable from the root",
            });
        }
    }
    Ok(())
}

/// Kahn's algorithm over the live nodes: if peeling zero-in-degree nodes
/// cannot consume the whole graph, the remainder contains a cycle.
fn check_acyclic<P: Publication>(graph: &CitationGraph<P>) -> CgResult<()> {
    let mut in_degree: HashMap<Slot, usize> = graph
        .arena
        .iter()
        .map(|(slot, node)| (slot, node.parents().len()))
        .collect();

    let mut queue: VecDeque<Slot> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&slot, _)| slot)
        .collect();

    let mut peeled = 0_usize;
    while let Some(slot) = queue.pop_front() {
        peeled += 1;
        let Some(node) = graph.arena.get(slot) else {
            continue;
        };
        for &child in node.children() {
            if let Some(degree) = in_degree.get_mut(&child) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(child);
                }
            }
        }
    }

    if peeled != in_degree.len() {
        return Err(CgError::Invariant {
            what: "citation edges must not form a cycle",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Paper(u32);

    impl Publication for Paper {
        type Id = u32;
        fn id(&self) -> u32 {
            self.0
        }
    }

    fn diamond() -> CitationGraph<Paper> {
        let mut graph = CitationGraph::new(Paper(0));
        graph.create(Paper(1), &0).unwrap();
        graph.create(Paper(2), &0).unwrap();
        graph.create_with_parents(Paper(3), &[1, 2]).unwrap();
        graph
    }

    #[test]
    fn well_formed_graph_passes() {
        assert!(diamond().validate().is_ok());
    }

    #[test]
    fn one_sided_edge_is_caught() {
        let mut graph = diamond();
        let a = graph.index[&1];
        let b = graph.index[&2];
        graph.arena.get_mut(a).unwrap().add_child(b);

        let err = graph.validate().unwrap_err();
        assert!(matches!(err, CgError::Invariant { .. }));
    }

    #[test]
    fn unindexed_live_node_is_caught() {
        let mut graph = diamond();
        graph.index.remove(&3);

        assert!(graph.validate().is_err());
    }

    #[test]
    fn unreachable_indexed_nodes_are_caught() {
        let mut graph = diamond();
        let root = graph.root;
        let a = graph.index[&1];
        let b = graph.index[&2];
        // Detach 1 and 2 from the root, then loop them into each other so
        // every node still has a mirrored parent edge.
        graph.arena.get_mut(root).unwrap().remove_child(a);
        graph.arena.get_mut(root).unwrap().remove_child(b);
        graph.arena.get_mut(a).unwrap().remove_parent(root);
        graph.arena.get_mut(b).unwrap().remove_parent(root);
        graph.arena.get_mut(a).unwrap().add_child(b);
        graph.arena.get_mut(b).unwrap().add_parent(a);
        graph.arena.get_mut(b).unwrap().add_child(a);
        graph.arena.get_mut(a).unwrap().add_parent(b);

        let err = graph.validate().unwrap_err();
        assert_eq!(
            err,
            CgError::Invariant {
                what: "indexed publication must be reachable from the root",
            }
        );
    }

    #[test]
    fn mirrored_cycle_is_caught() {
        let mut graph = diamond();
        // Close a mirrored loop 1 -> 3 -> 1 behind the public API's back.
        let a = graph.index[&1];
        let c = graph.index[&3];
        graph.arena.get_mut(c).unwrap().add_child(a);
        graph.arena.get_mut(a).unwrap().add_parent(c);

        let err = graph.validate().unwrap_err();
        assert_eq!(
            err,
            CgError::Invariant {
                what: "citation edges must not form a cycle",
            }
        );
    }
}

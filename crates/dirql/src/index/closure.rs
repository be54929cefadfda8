//! Closure table over entry ids.
//!
//! Every (ancestor, descendant) reachability pair of the walked tree is stored
//! as one edge together with its hop count. Inserting an entry copies the edges
//! that end at its parent, so insertion costs O(depth of parent) and a subtree
//! query is a single lookup by ancestor.

use std::fmt;

use crate::error::{DirqlError, Result};
use crate::storage::EntryId;

/// One reachability pair. `depth` counts parent hops from ancestor to descendant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosureEdge {
    pub ancestor_id: EntryId,
    pub descendant_id: EntryId,
    pub depth: u32,
}

impl fmt::Display for ClosureEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.ancestor_id, self.descendant_id)
    }
}

/// Arena of closure edges with per-entry adjacency in both directions.
///
/// `by_ancestor` and `by_descendant` are dense tables indexed by entry slot and
/// hold positions into `edges`.
#[derive(Debug, Default)]
pub struct ClosureIndex {
    edges: Vec<ClosureEdge>,
    by_ancestor: Vec<Vec<u32>>,
    by_descendant: Vec<Vec<u32>>,
}

impl ClosureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links a freshly assigned id into the closure.
    ///
    /// Inserts the self-edge and, for a parent, one edge per edge ending at the
    /// parent with the depth incremented. Ids must arrive in assignment order and
    /// the parent must already be linked.
    pub fn insert(&mut self, id: EntryId, parent: Option<EntryId>) -> Result<()> {
        let expected = EntryId::from_slot(self.by_descendant.len());
        if id != expected {
            return Err(DirqlError::Index(format!(
                "entry {id} linked out of order, expected {expected}"
            )));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(DirqlError::Index(format!(
                    "parent {parent} of entry {id} is not indexed"
                )));
            }
        }

        self.by_ancestor.push(Vec::new());
        self.by_descendant.push(Vec::new());
        self.push_edge(ClosureEdge {
            ancestor_id: id,
            descendant_id: id,
            depth: 0,
        });

        if let Some(parent) = parent {
            let inherited: Vec<ClosureEdge> = self
                .ancestors(parent)
                .map(|(ancestor_id, depth)| ClosureEdge {
                    ancestor_id,
                    descendant_id: id,
                    depth: depth + 1,
                })
                .collect();
            for edge in inherited {
                self.push_edge(edge);
            }
        }

        Ok(())
    }

    fn push_edge(&mut self, edge: ClosureEdge) {
        let position = self.edges.len() as u32;
        self.edges.push(edge);
        self.by_ancestor[edge.ancestor_id.slot()].push(position);
        self.by_descendant[edge.descendant_id.slot()].push(position);
    }

    /// All `(descendant, depth)` pairs below `root`, including `root` at depth 0.
    ///
    /// Depths are relative to `root`. An unknown root yields nothing.
    pub fn subtree(&self, root: EntryId) -> impl Iterator<Item = (EntryId, u32)> + '_ {
        self.edge_slice(&self.by_ancestor, root)
            .iter()
            .map(|&position| {
                let edge = &self.edges[position as usize];
                (edge.descendant_id, edge.depth)
            })
    }

    /// All `(ancestor, depth)` pairs above `id`, including `id` at depth 0.
    pub fn ancestors(&self, id: EntryId) -> impl Iterator<Item = (EntryId, u32)> + '_ {
        self.edge_slice(&self.by_descendant, id)
            .iter()
            .map(|&position| {
                let edge = &self.edges[position as usize];
                (edge.ancestor_id, edge.depth)
            })
    }

    fn edge_slice<'a>(&self, table: &'a [Vec<u32>], id: EntryId) -> &'a [u32] {
        table.get(id.slot()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Depth of `descendant` below `ancestor`, if it is in that subtree.
    pub fn depth(&self, ancestor: EntryId, descendant: EntryId) -> Option<u32> {
        self.ancestors(descendant)
            .find(|(candidate, _)| *candidate == ancestor)
            .map(|(_, depth)| depth)
    }

    #[inline]
    pub fn contains(&self, id: EntryId) -> bool {
        id.slot() < self.by_descendant.len()
    }

    /// Every edge in insertion order.
    #[inline]
    pub fn edges(&self) -> &[ClosureEdge] {
        &self.edges
    }

    /// Number of linked entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.by_descendant.len()
    }

    /// Number of stored edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

//! Read-only adjacency over slots, derived from the grid's overlaps.
//!
//! Nothing here is algorithmic beyond grouping: the graph exists so the
//! consistency engine and the search can enumerate a slot's crossings, and
//! the directed arcs between slots, without recomputing them.

use smallvec::SmallVec;

use crate::grid::{Grid, SlotId};

/// One crossing seen from a single slot: the other slot involved, the index
/// of the shared cell within this slot, and its index within the other slot.
#[derive(Debug, Clone, Copy)]
pub struct Crossing {
    pub other: SlotId,
    pub own_index: usize,
    pub other_index: usize,
}

impl Crossing {
    /// The same crossing seen from the other slot's side.
    #[must_use]
    pub fn reversed(&self, own: SlotId) -> (SlotId, Crossing) {
        (
            self.other,
            Crossing { other: own, own_index: self.other_index, other_index: self.own_index },
        )
    }
}

/// Per-slot crossing lists for a grid.
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    crossings: Vec<SmallVec<[Crossing; 8]>>,
}

impl ConstraintGraph {
    /// Group the grid's overlaps into per-slot adjacency lists.
    #[must_use]
    pub fn build(grid: &Grid) -> ConstraintGraph {
        let mut crossings: Vec<SmallVec<[Crossing; 8]>> =
            vec![SmallVec::new(); grid.slots().len()];

        for overlap in grid.overlaps() {
            crossings[overlap.a].push(Crossing {
                other: overlap.b,
                own_index: overlap.a_index,
                other_index: overlap.b_index,
            });
            crossings[overlap.b].push(Crossing {
                other: overlap.a,
                own_index: overlap.b_index,
                other_index: overlap.a_index,
            });
        }

        ConstraintGraph { crossings }
    }

    /// All crossings of `slot`, one per neighboring slot.
    #[must_use]
    pub fn crossings(&self, slot: SlotId) -> &[Crossing] {
        &self.crossings[slot]
    }

    /// Number of slots this slot crosses.
    #[must_use]
    pub fn degree(&self, slot: SlotId) -> usize {
        self.crossings[slot].len()
    }

    /// Number of slots in the graph.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.crossings.len()
    }

    /// Every directed arc `(x, crossing-into-y)`, for worklist seeding.
    pub fn arcs(&self) -> impl Iterator<Item = (SlotId, Crossing)> + '_ {
        self.crossings
            .iter()
            .enumerate()
            .flat_map(|(slot, list)| list.iter().map(move |&c| (slot, c)))
    }
}

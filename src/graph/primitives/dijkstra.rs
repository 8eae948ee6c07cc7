use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::{FxHashSet, FxHasher};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::{BuildHasherDefault, Hash};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Path cost, in centimeters.
pub type Cost = u64;

/// Sentinel parent index for the start nodes of a search.
const NO_PARENT: usize = usize::MAX;

#[derive(Debug)]
struct SmallestHolder {
    cost: Cost,
    index: usize,
}

impl PartialEq for SmallestHolder {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for SmallestHolder {}

impl PartialOrd for SmallestHolder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestHolder {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
    }
}

/// Struct returned by [`Dijkstra::reach`].
///
/// Iterates over the reachable nodes in order of ascending cost. Once
/// iteration stops (the caller may stop at any bound), the path to any
/// yielded node can be recovered with [`DijkstraReachable::path`].
pub struct DijkstraReachable<N, L, FN> {
    to_see: BinaryHeap<SmallestHolder>,
    seen: FxHashSet<usize>,
    parents: FxIndexMap<N, (usize, Cost, Option<L>)>,
    successors: FN,
}

/// Information about a node reached by [`Dijkstra::reach`].
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct DijkstraReachableItem<N> {
    /// The node that was reached.
    pub node: N,
    /// The previous node that the current node came from.
    /// If the node is a start node, there will be no parent.
    pub parent: Option<N>,
    /// The total cost from the (cheapest) start node.
    pub total_cost: Cost,
}

impl<N, L, FN, IN> Iterator for DijkstraReachable<N, L, FN>
where
    N: Eq + Hash + Copy,
    L: Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, Cost, L)>,
{
    type Item = DijkstraReachableItem<N>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(SmallestHolder { cost, index }) = self.to_see.pop() {
            if !self.seen.insert(index) {
                continue;
            }

            let Some((node, (parent_index, _, _))) = self.parents.get_index(index) else {
                continue;
            };

            let (node, parent_index) = (*node, *parent_index);
            let item = DijkstraReachableItem {
                node,
                parent: self.parents.get_index(parent_index).map(|x| *x.0),
                total_cost: cost,
            };

            for (successor, move_cost, label) in (self.successors)(&node) {
                let new_cost = cost.saturating_add(move_cost);

                let index = match self.parents.entry(successor) {
                    Entry::Vacant(e) => {
                        let n = e.index();
                        e.insert((index, new_cost, Some(label)));
                        n
                    }
                    Entry::Occupied(mut e) => {
                        if e.get().1 > new_cost {
                            e.insert((index, new_cost, Some(label)));
                            e.index()
                        } else {
                            continue;
                        }
                    }
                };

                self.to_see.push(SmallestHolder {
                    cost: new_cost,
                    index,
                });
            }

            return Some(item);
        }

        None
    }
}

impl<N, L, FN> DijkstraReachable<N, L, FN>
where
    N: Eq + Hash + Copy,
    L: Copy,
{
    /// Creates a path from the start of the search up to `target`, following the
    /// parent map. Each entry holds the node and the label of the move used to reach
    /// it, which is `None` for the start node.
    ///
    /// Returns in the order `[start, ..., target]`, or `None` if `target` was never reached.
    pub fn path(&self, target: &N) -> Option<Vec<(N, Option<L>)>> {
        let mut index = self.parents.get_index_of(target)?;
        let mut rev = vec![];

        loop {
            let (node, (parent, _, label)) = self.parents.get_index(index)?;
            rev.push((*node, *label));

            if *parent == NO_PARENT {
                break;
            }

            index = *parent;
        }

        rev.reverse();
        Some(rev)
    }
}

pub struct Dijkstra;

impl Dijkstra {
    /// Visit all nodes that are reachable from a set of start nodes, each with an
    /// initial cost. The nodes will be visited in order of cost, with the closest
    /// nodes first.
    ///
    /// The `successors` function receives the current node, and returns
    /// an iterator of successors associated with their move cost and a label
    /// describing the move (such as the edge taken).
    pub fn reach<N, L, FN, IN>(
        &self,
        starts: impl IntoIterator<Item = (N, Cost)>,
        successors: FN,
    ) -> DijkstraReachable<N, L, FN>
    where
        N: Eq + Hash + Copy,
        L: Copy,
        FN: FnMut(&N) -> IN,
        IN: IntoIterator<Item = (N, Cost, L)>,
    {
        let mut to_see: BinaryHeap<SmallestHolder> = BinaryHeap::with_capacity(256);
        let mut parents: FxIndexMap<N, (usize, Cost, Option<L>)> =
            FxIndexMap::with_capacity_and_hasher(64, BuildHasherDefault::<FxHasher>::default());

        for (start, cost) in starts {
            match parents.entry(start) {
                Entry::Vacant(e) => {
                    let index = e.index();
                    e.insert((NO_PARENT, cost, None));
                    to_see.push(SmallestHolder { cost, index });
                }
                Entry::Occupied(mut e) if e.get().1 > cost => {
                    let index = e.index();
                    e.insert((NO_PARENT, cost, None));
                    to_see.push(SmallestHolder { cost, index });
                }
                Entry::Occupied(_) => {}
            }
        }

        DijkstraReachable {
            to_see,
            seen: FxHashSet::default(),
            parents,
            successors,
        }
    }
}

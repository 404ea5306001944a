//! # FP-Tree
//!
//! Prefix-sharing tree over frequency-ordered transactions.
//!
//! Items are referred to by rank: rank 0 is the most frequent item of the
//! whole input. Paths are always inserted in ascending rank order, so
//! transactions sharing their most frequent items share a prefix.
//!
//! The same structure serves as the conditional tree during mining: a
//! conditional pattern base is just a list of weighted rank paths.

use std::collections::BTreeMap;

/// Position of an item in the global frequency order.
pub type Rank = usize;

/// A weighted path of ranks in ascending order.
pub type WeightedPath = (Vec<Rank>, u64);

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct FpNode {
    rank: Rank,
    count: u64,
    parent: usize,
    children: BTreeMap<Rank, usize>,
}

/// Arena-backed FP-tree with a header table of node links.
#[derive(Debug, Clone)]
pub struct FpTree {
    /// Node arena; index 0 is the root and carries no item.
    nodes: Vec<FpNode>,
    /// Header table: rank -> every node holding that rank.
    header: BTreeMap<Rank, Vec<usize>>,
    /// Total count per rank in this tree. Only ranks meeting the minimum.
    counts: BTreeMap<Rank, u64>,
}

impl FpTree {
    /// Build a tree from weighted paths, dropping ranks whose total weight
    /// is below `min_count`.
    #[must_use]
    pub fn build(paths: &[WeightedPath], min_count: u64) -> Self {
        let mut totals: BTreeMap<Rank, u64> = BTreeMap::new();
        for (path, weight) in paths {
            for &rank in path {
                let total = totals.entry(rank).or_insert(0);
                *total = total.saturating_add(*weight);
            }
        }
        totals.retain(|_, total| *total >= min_count);

        let mut tree = Self {
            nodes: vec![FpNode {
                rank: 0,
                count: 0,
                parent: ROOT,
                children: BTreeMap::new(),
            }],
            header: BTreeMap::new(),
            counts: totals,
        };

        let mut kept = Vec::new();
        for (path, weight) in paths {
            kept.clear();
            kept.extend(path.iter().copied().filter(|r| tree.counts.contains_key(r)));
            kept.sort_unstable();
            kept.dedup();
            if !kept.is_empty() {
                tree.insert(&kept, *weight);
            }
        }

        tree
    }

    fn insert(&mut self, path: &[Rank], weight: u64) {
        let mut current = ROOT;
        for &rank in path {
            let existing = self.nodes[current].children.get(&rank).copied();
            current = match existing {
                Some(child) => {
                    let node = &mut self.nodes[child];
                    node.count = node.count.saturating_add(weight);
                    child
                }
                None => {
                    let index = self.nodes.len();
                    self.nodes.push(FpNode {
                        rank,
                        count: weight,
                        parent: current,
                        children: BTreeMap::new(),
                    });
                    self.nodes[current].children.insert(rank, index);
                    self.header.entry(rank).or_default().push(index);
                    index
                }
            };
        }
    }

    /// Whether the tree holds no frequent item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of nodes excluding the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Frequent ranks with their counts, ascending rank.
    pub fn item_counts(&self) -> impl DoubleEndedIterator<Item = (Rank, u64)> + '_ {
        self.counts.iter().map(|(&rank, &count)| (rank, count))
    }

    /// Conditional pattern base of `rank`: the prefix path above every node
    /// holding `rank`, weighted by that node's count.
    #[must_use]
    pub fn conditional_base(&self, rank: Rank) -> Vec<WeightedPath> {
        let Some(links) = self.header.get(&rank) else {
            return Vec::new();
        };

        let mut base = Vec::with_capacity(links.len());
        for &index in links {
            let node = &self.nodes[index];
            let mut path = Vec::new();
            let mut cursor = node.parent;
            while cursor != ROOT {
                let ancestor = &self.nodes[cursor];
                path.push(ancestor.rank);
                cursor = ancestor.parent;
            }
            if !path.is_empty() {
                path.reverse();
                base.push((path, node.count));
            }
        }
        base
    }
}

// =============================================================================
// TESTS
// =============================================================================

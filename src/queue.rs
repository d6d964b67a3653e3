use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::similarity::Similarity;

/// A sort key for one [`Similarity`] inside the priority queue: descending
/// score, then ascending `cluster1`, then ascending `cluster2` (plain string
/// order, matching the canonicalization rule in [`Similarity::new`]; natural
/// sort is reserved for the human-facing orderings on
/// [`Cluster`](crate::cluster::Cluster) and
/// [`ClusterGroup::get_clusters`](crate::group::ClusterGroup::get_clusters)).
///
/// `Similarity` itself deliberately has no `Ord` impl, because its own
/// equality considers only the endpoint pair while this order's primary key
/// is score — mixing the two on one type would make `a == b` and
/// `a.cmp(b) == Equal` disagree, which violates `Ord`'s contract. This
/// wrapper's `Eq` is derived from the same three fields its `Ord` compares,
/// so the two stay consistent with each other; it is private to this module,
/// so nothing outside ever has to reason about its (stricter, score-aware)
/// notion of equality.
#[derive(Clone, Debug)]
struct QueueEntry(Similarity);

impl PartialEq for QueueEntry {
    fn eq(&self, other: &QueueEntry) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &QueueEntry) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &QueueEntry) -> Ordering {
        other
            .0
            .score()
            .total_cmp(&self.0.score())
            .then_with(|| self.0.cluster1().cmp(other.0.cluster1()))
            .then_with(|| self.0.cluster2().cmp(other.0.cluster2()))
    }
}

/// A priority queue of candidate merges, ordered by descending score, then
/// ascending ids (see [`QueueEntry`]).
///
/// Unlike a textbook binary heap, edge scores change in place as merges
/// happen, which is awkward for most heap implementations: a changed
/// priority has to be found and re-sifted, and most heaps don't expose a way
/// to find an arbitrary element at all. The merge algorithm sidesteps this
/// by always removing an edge before mutating its score and reinserting it
/// (see [`crate::group`]'s module docs), so all this queue actually needs is
/// pop-the-best, and bulk removal/insertion by value — exactly what a
/// `BTreeSet` keyed on the full sort order gives for free. This is simpler
/// than a hand-rolled indexed heap because there is no fixed universe of
/// dense integer labels to size a positional array over; the keys here are
/// arbitrary similarity values.
#[derive(Debug, Default)]
pub struct SimilarityQueue {
    entries: BTreeSet<QueueEntry>,
}

impl SimilarityQueue {
    /// Create a new, empty queue.
    pub fn new() -> SimilarityQueue {
        SimilarityQueue { entries: BTreeSet::new() }
    }

    /// The number of edges currently queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no edges are queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an edge into the queue.
    ///
    /// If an edge with the same endpoint pair *and* the same score is
    /// already present, this is a no-op. An edge for the same pair with a
    /// *different* score is a distinct entry under this queue's sort key and
    /// will coexist alongside it; callers that need "overwrite" semantics
    /// (like [`crate::group::ClusterGroup::add_sim`]) must call
    /// [`SimilarityQueue::remove`] with the previous value first.
    pub fn insert(&mut self, edge: Similarity) {
        self.entries.insert(QueueEntry(edge));
    }

    /// Remove a specific edge from the queue, if present.
    ///
    /// `edge` must carry the same score as the stored entry: this queue's
    /// sort key includes the score, so removal only matches an exact score.
    /// Callers hold on to the live edge (e.g. from a cluster's adjacency
    /// map) rather than reconstructing one from the id pair alone.
    pub fn remove(&mut self, edge: &Similarity) {
        self.entries.remove(&QueueEntry(edge.clone()));
    }

    /// Pop and return the highest-scoring edge, or `None` if the queue is
    /// empty.
    pub fn pop_best(&mut self) -> Option<Similarity> {
        self.entries.pop_first().map(|entry| entry.0)
    }
}

//! `ClusterGroup`, the owning structure that drives agglomerative merges.
//!
//! A `ClusterGroup` holds every currently-extant [`Cluster`], keyed by id,
//! plus a global [`SimilarityQueue`] of every edge between two extant
//! clusters. Edges stream in one at a time through [`ClusterGroup::add_sim`],
//! auto-creating singleton clusters the first time an id is seen. Merges
//! happen one at a time through [`ClusterGroup::merge`]; callers are
//! expected to loop on it until it returns `false`.
//!
//! The tricky part of this module is keeping three things in lockstep across
//! every merge: the cluster map, each cluster's adjacency map, and the
//! global queue. The merge procedure below follows a fixed sequence
//! (snapshot, purge, sever, recompute, update, detach, reinsert, apply) so
//! that it's always possible to point at exactly which invariant each step
//! maintains.

use std::collections::HashMap;

use crate::cluster::Cluster;
use crate::method::LinkageMethod;
use crate::queue::SimilarityQueue;
use crate::similarity::Similarity;

/// Owns a collection of clusters and the global priority queue of candidate
/// merges between them, and drives the merge procedure.
#[derive(Debug)]
pub struct ClusterGroup {
    clusters: HashMap<String, Cluster>,
    queue: SimilarityQueue,
    method: LinkageMethod,
    max_size: usize,
    /// Observational only (see §4.4 step 5 of the spec this crate
    /// implements): the number of `add_sim` calls that overwrote an
    /// existing edge rather than creating a new one.
    duplicate_edges: u64,
}

impl ClusterGroup {
    /// Create a new, empty group using the given linkage method.
    ///
    /// `estimated_points` presizes the internal cluster map; it is a
    /// performance hint, not a hard limit; this method does not validate it.
    pub fn new(estimated_points: usize, method: LinkageMethod) -> ClusterGroup {
        ClusterGroup {
            clusters: HashMap::with_capacity(estimated_points),
            queue: SimilarityQueue::new(),
            method,
            max_size: usize::MAX,
            duplicate_edges: 0,
        }
    }

    /// The number of currently-extant clusters.
    pub fn size(&self) -> usize {
        self.clusters.len()
    }

    /// Look up an extant cluster by id.
    pub fn get_cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.get(id)
    }

    /// All extant clusters, sorted descending by size, then descending by
    /// score, then ascending by id (natural sort). See [`Cluster::cmp`].
    pub fn get_clusters(&self) -> Vec<&Cluster> {
        let mut clusters: Vec<&Cluster> = self.clusters.values().collect();
        clusters.sort();
        clusters
    }

    /// The current maximum cluster size a merge is allowed to produce.
    pub fn get_max_size(&self) -> usize {
        self.max_size
    }

    /// Set the maximum cluster size a merge is allowed to produce.
    ///
    /// A merge whose two endpoints would together exceed this size is
    /// permanently skipped (see [`ClusterGroup::merge`]); it does not retry
    /// once the cap is raised again; edges abandoned under a given cap stay
    /// abandoned.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    /// The total number of `add_sim` calls so far that overwrote an
    /// already-present edge between the same pair of ids, rather than
    /// creating a new one. Observational only.
    pub fn duplicate_edges(&self) -> u64 {
        self.duplicate_edges
    }

    /// Ingest one pairwise similarity, auto-creating singleton clusters for
    /// either id the first time it is seen.
    ///
    /// A non-finite `score` is coerced to negative infinity (see
    /// [`Similarity::new`]). Ingesting the same unordered pair twice
    /// overwrites the earlier edge: the later score wins in both the
    /// adjacency maps and the priority queue (this crate resolves the
    /// "does the queue entry get overwritten too" ambiguity as "yes", see
    /// `DESIGN.md`).
    pub fn add_sim(&mut self, id1: &str, id2: &str, score: f64) {
        self.clusters
            .entry(id1.to_string())
            .or_insert_with(|| Cluster::new_singleton(id1));
        self.clusters
            .entry(id2.to_string())
            .or_insert_with(|| Cluster::new_singleton(id2));

        let edge = Similarity::new(id1, id2, score);

        let previous = self.clusters[edge.cluster1()].sims().find(|s| *s == &edge).cloned();
        if let Some(previous) = previous {
            self.queue.remove(&previous);
            self.duplicate_edges += 1;
            log::debug!(
                "overwriting edge {}-{}: {} -> {} (duplicate #{})",
                edge.cluster1(),
                edge.cluster2(),
                previous.score(),
                edge.score(),
                self.duplicate_edges
            );
        }

        self.queue.insert(edge.clone());
        self.clusters.get_mut(edge.cluster1()).unwrap().add_sim(edge.clone());
        self.clusters.get_mut(edge.cluster2()).unwrap().add_sim(edge);
    }

    /// Attempt exactly one merge.
    ///
    /// Returns `true` if a merge happened. Returns `false` if the queue is
    /// exhausted, or if the best remaining edge scores below `min_sim` (in
    /// which case no further merge is possible under this cutoff, now or
    /// ever — see the pop-best loop below). Callers loop on this until it
    /// returns `false`.
    pub fn merge(&mut self, min_sim: f64) -> bool {
        loop {
            let edge = match self.queue.pop_best() {
                Some(edge) => edge,
                None => return false,
            };
            if edge.score() < min_sim {
                // Nothing queued can score higher than `edge` (it was the
                // best candidate), so no further merge is possible under
                // this cutoff. `edge` is dropped, not reinserted: only a
                // future score change (from a merge elsewhere) can ever
                // bring an edge above a threshold it once failed.
                return false;
            }

            let a_len = self.clusters[edge.cluster1()].len();
            let b_len = self.clusters[edge.cluster2()].len();
            if a_len + b_len > self.max_size {
                // Permanently disqualified: the endpoints only ever grow,
                // so this pair can never satisfy the cap. Drop `edge` and
                // try the next-best candidate.
                continue;
            }

            self.execute_merge(edge);
            return true;
        }
    }

    /// Perform the ten-step merge procedure for `edge`, whose endpoints are
    /// known to be mergeable (cutoff and size cap already checked by the
    /// caller).
    fn execute_merge(&mut self, edge: Similarity) {
        let a_id = edge.cluster1().to_string();
        let b_id = edge.cluster2().to_string();

        // Step 1 (partial, already done by caller) / step 9 setup: pull A
        // and B out of the map so we can mutate them freely alongside
        // lookups into the rest of `self.clusters`.
        let mut a = self.clusters.remove(&a_id).expect("A must be extant");
        let mut b = self.clusters.remove(&b_id).expect("B must be extant");

        // Step 2: snapshot edge sets before anything is mutated.
        let a_sims: Vec<Similarity> = a.sims().cloned().collect();
        let b_sims: Vec<Similarity> = b.sims().cloned().collect();

        // Step 3: purge the queue of every edge incident to A or B. `edge`
        // itself was already popped by the caller.
        for sim in b_sims.iter().chain(a_sims.iter()) {
            self.queue.remove(sim);
        }

        // Step 4: sever the A-B adjacency entry on A's side so it isn't
        // iterated over in step 6. B's side is dropped wholesale below.
        a.remove_sim(&b_id);

        // Step 5: compute the merged cluster's new internal score, using
        // the old sizes and old internal scores (neither A nor B has been
        // mutated toward its post-merge state yet).
        let new_score = self.method.merged_score(a.score(), b.score(), edge.score(), a.len(), b.len());

        // Step 6: update A's outgoing edges, which become the merged
        // cluster's edges. Each edge only needs A's and B's *old*
        // scoreTo(X); B hasn't been mutated yet, so b.score_to(x) is still
        // valid here.
        let mut updated = Vec::with_capacity(a_sims.len());
        for mut f in a.sims().cloned().collect::<Vec<_>>() {
            let x_id = f.other_id(&a_id).to_string();
            let x = self.clusters.get(&x_id).expect("neighbour must be extant");
            f.update(self.method, edge.score(), &a, &b, x);
            updated.push(f);
        }

        // Step 7: detach B from every neighbour except A (already handled
        // in step 4). After this, no extant cluster's adjacency references
        // B.
        for sim in &b_sims {
            let y_id = sim.other_id(&b_id);
            if y_id == a_id {
                continue;
            }
            if let Some(y) = self.clusters.get_mut(y_id) {
                y.remove_sim(&b_id);
            }
        }

        // Step 6 (mirroring) + step 8: mirror every updated edge into both
        // A's and X's adjacency maps, and reinsert into the queue only if
        // the merged cluster stays under the size cap. The adjacency-side
        // mirroring always happens, even when the queue reinsertion is
        // withheld, so `scoreTo` keeps answering correctly for clusters
        // that can no longer be merged (see the documented exception in
        // `SPEC_FULL.md` §3).
        let merged_size = a.len() + b.len();
        for f in updated {
            let x_id = f.other_id(&a_id).to_string();
            if merged_size < self.max_size {
                self.queue.insert(f.clone());
            }
            a.add_sim(f.clone());
            if let Some(x) = self.clusters.get_mut(&x_id) {
                x.add_sim(f);
            }
        }

        // Step 9: apply membership and score changes, then reinstate A
        // (under its unchanged id) as the sole survivor.
        a.merge(&b);
        a.set_score(new_score);
        self.clusters.insert(a_id, a);
    }
}

#[cfg(test)]
mod tests {
    use super::ClusterGroup;
    use crate::method::LinkageMethod;

    fn members_of<'a>(group: &'a ClusterGroup, id: &str) -> Vec<&'a str> {
        let mut members: Vec<&str> = group.get_cluster(id).unwrap().members().collect();
        members.sort();
        members
    }

    #[test]
    fn scenario_s1_complete_three_point_chain() {
        let mut g = ClusterGroup::new(3, LinkageMethod::Complete);
        g.add_sim("A", "B", 0.9);
        g.add_sim("B", "C", 0.8);
        g.add_sim("A", "C", 0.5);

        assert!(g.merge(0.0));
        let ab = g.get_cluster("A").unwrap();
        assert_eq!(members_of(&g, "A"), vec!["A", "B"]);
        assert_eq!(ab.score(), 0.9);
        assert_eq!(ab.score_to("C"), 0.5);

        assert!(g.merge(0.0));
        let merged = g.get_cluster("A").unwrap();
        assert_eq!(members_of(&g, "A"), vec!["A", "B", "C"]);
        assert_eq!(merged.height(), 3);
        assert_eq!(merged.score(), 0.5);

        assert!(!g.merge(0.0));
        assert_eq!(g.size(), 1);
    }

    #[test]
    fn scenario_s2_single_linkage() {
        let mut g = ClusterGroup::new(3, LinkageMethod::Single);
        g.add_sim("A", "B", 0.9);
        g.add_sim("B", "C", 0.8);
        g.add_sim("A", "C", 0.5);

        g.merge(0.0);
        let ab = g.get_cluster("A").unwrap();
        assert_eq!(ab.score_to("C"), 0.8);
        assert_eq!(ab.score(), 0.9);

        g.merge(0.0);
        assert_eq!(g.get_cluster("A").unwrap().score(), 0.9);
    }

    #[test]
    fn scenario_s3_average_linkage() {
        let mut g = ClusterGroup::new(3, LinkageMethod::Average);
        g.add_sim("A", "B", 0.9);
        g.add_sim("B", "C", 0.8);
        g.add_sim("A", "C", 0.5);

        g.merge(0.0);
        let ab = g.get_cluster("A").unwrap();
        assert!((ab.score_to("C") - 0.65).abs() < 1e-12);
        assert_eq!(ab.score(), 0.9);

        g.merge(0.0);
        let expected = (0.65 * 2.0 + 0.9) / 3.0;
        assert!((g.get_cluster("A").unwrap().score() - expected).abs() < 1e-12);
    }

    #[test]
    fn scenario_s4_cutoff_stops_merging() {
        let mut g = ClusterGroup::new(4, LinkageMethod::Complete);
        g.add_sim("A", "B", 0.9);
        g.add_sim("C", "D", 0.8);
        g.add_sim("A", "C", 0.3);

        let mut merges = 0;
        while g.merge(0.5) {
            merges += 1;
        }
        assert_eq!(merges, 2);
        assert_eq!(g.size(), 2);
        assert_eq!(members_of(&g, "A"), vec!["A", "B"]);
        assert_eq!(members_of(&g, "C"), vec!["C", "D"]);
    }

    #[test]
    fn below_cutoff_edge_is_dropped_not_merely_deferred() {
        // The popped-but-below-cutoff edge is gone for good, not put back
        // for a future, lower cutoff to pick up: a later `merge` call with a
        // lower cutoff must not resurrect it.
        let mut g = ClusterGroup::new(2, LinkageMethod::Complete);
        g.add_sim("A", "B", 0.3);

        assert!(!g.merge(0.5));
        assert_eq!(g.size(), 2);

        assert!(!g.merge(0.3));
        assert_eq!(g.size(), 2);
    }

    #[test]
    fn scenario_s5_and_s6_size_cap_permanently_drops_edges() {
        // A, B, C, D all pairwise connected except C-D: the best edge A-B
        // merges, and every edge left in the queue (A-C, B-C, A-D, B-D) is
        // incident to the newly-capped {A,B}, so it's purged at step 3 and
        // never reinserted at step 8. With no surviving candidate edge, C
        // and D stay singletons forever, even though a direct C-D merge
        // would itself have fit under the cap.
        let mut g = ClusterGroup::new(4, LinkageMethod::Complete);
        g.add_sim("A", "B", 0.9);
        g.add_sim("A", "C", 0.85);
        g.add_sim("B", "C", 0.8);
        g.add_sim("A", "D", 0.7);
        g.add_sim("B", "D", 0.7);
        g.set_max_size(2);

        let mut merges = 0;
        while g.merge(0.0) {
            merges += 1;
        }
        assert_eq!(merges, 1);
        assert_eq!(g.size(), 3);
        assert_eq!(members_of(&g, "A"), vec!["A", "B"]);
        assert!(g.get_cluster("C").is_some());
        assert!(g.get_cluster("D").is_some());

        // Raising the cap afterwards does not resurrect abandoned edges;
        // the merge above already consumed and dropped them for good.
        g.set_max_size(10);
        assert!(!g.merge(0.0));
    }

    #[test]
    fn idempotent_reingestion() {
        let mut g1 = ClusterGroup::new(2, LinkageMethod::Complete);
        g1.add_sim("A", "B", 0.5);
        g1.add_sim("A", "B", 0.5);

        let mut g2 = ClusterGroup::new(2, LinkageMethod::Complete);
        g2.add_sim("A", "B", 0.5);

        assert_eq!(g1.size(), g2.size());
        assert_eq!(g1.get_cluster("A").unwrap().score_to("B"), g2.get_cluster("A").unwrap().score_to("B"));
        assert_eq!(g1.duplicate_edges(), 1);
        assert_eq!(g2.duplicate_edges(), 0);
    }

    #[test]
    fn unordered_endpoints_are_equivalent() {
        let mut g1 = ClusterGroup::new(2, LinkageMethod::Complete);
        g1.add_sim("A", "B", 0.5);

        let mut g2 = ClusterGroup::new(2, LinkageMethod::Complete);
        g2.add_sim("B", "A", 0.5);

        assert_eq!(g1.get_cluster("A").unwrap().score_to("B"), g2.get_cluster("A").unwrap().score_to("B"));
    }

    #[test]
    fn duplicate_with_different_score_overwrites_queue_too() {
        let mut g = ClusterGroup::new(3, LinkageMethod::Complete);
        g.add_sim("A", "B", 0.1);
        g.add_sim("B", "C", 0.9);
        // Overwrite A-B with a higher score than B-C; if the queue kept the
        // stale low-score entry, the next merge would pick B-C instead.
        g.add_sim("A", "B", 0.95);

        assert!(g.merge(0.0));
        assert_eq!(members_of(&g, "A"), vec!["A", "B"]);
    }

    #[test]
    fn unknown_id_lookup_returns_none() {
        let g = ClusterGroup::new(1, LinkageMethod::Complete);
        assert!(g.get_cluster("nope").is_none());
    }

    #[test]
    fn get_clusters_sort_order() {
        let mut g = ClusterGroup::new(4, LinkageMethod::Complete);
        g.add_sim("b2", "b1", 0.9);
        g.add_sim("a1", "z9", -1.0); // never merged; both stay singletons
        g.merge(0.0);

        let listed = g.get_clusters();
        let ids: Vec<&str> = listed.iter().map(|c| c.id()).collect();
        // {b1,b2} has size 2 and sorts first; remaining singletons in
        // natural-sort id order.
        assert_eq!(ids[0], "b1");
        assert_eq!(&ids[1..], &["a1", "z9"]);
    }

    quickcheck::quickcheck! {
        fn prop_merging_to_completion_conserves_membership(mut scores: Vec<f64>) -> bool {
            scores.truncate(10);
            scores.retain(|s| s.is_finite());
            if scores.len() < 2 {
                return true;
            }
            let n = scores.len();
            let mut g = ClusterGroup::new(n, LinkageMethod::Complete);
            for i in 0..n {
                for j in (i + 1)..n {
                    let score = scores[i] - scores[j];
                    g.add_sim(&format!("p{}", i), &format!("p{}", j), score);
                }
            }
            while g.merge(f64::NEG_INFINITY) {}

            let mut all_members: Vec<String> = g
                .get_clusters()
                .iter()
                .flat_map(|c| c.members().map(|m| m.to_string()))
                .collect();
            all_members.sort();
            all_members.dedup();
            all_members.len() == n
        }
    }
}

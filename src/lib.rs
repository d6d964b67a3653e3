/*!
This crate provides an incremental agglomerative clustering engine built
around a stream of named pairwise similarities rather than a precomputed
dissimilarity matrix.

Most hierarchical clustering implementations (including
[SciPy's](https://docs.scipy.org/doc/scipy/reference/generated/scipy.cluster.hierarchy.linkage.html)
and Müllner's [`fastcluster`](http://danifold.net/fastcluster.html), on which
an earlier version of this crate was directly modeled) take a dense,
condensed matrix of all pairwise distances between a fixed, known-in-advance
set of observations indexed `0..n`. That shape doesn't fit a common case:
similarity scores arriving one at a time, between arbitrary opaque ids, with
most pairs never scored at all because they're not worth comparing (deduping
records, entity resolution, near-duplicate detection). This crate clusters
that stream directly.

# Overview

* [`ClusterGroup`] is the entry point: feed it similarities with
  [`ClusterGroup::add_sim`], then drain merges with [`ClusterGroup::merge`]
  until it returns `false`.
* [`LinkageMethod`] selects how two clusters' combined similarity to a third
  cluster is computed, and how a merged cluster's own internal cohesion score
  is computed.
* [`Cluster`] is a single node in the clustering, either a singleton or the
  product of one or more merges.
* [`Similarity`] is an edge between two clusters.
* [`ClusterReader`] is a convenience loader for a simple tab-delimited text
  format.

# Example

```
use clustergroup::{ClusterGroup, LinkageMethod};

let mut group = ClusterGroup::new(3, LinkageMethod::Complete);
group.add_sim("doc-1", "doc-2", 0.92);
group.add_sim("doc-2", "doc-3", 0.81);
group.add_sim("doc-1", "doc-3", 0.40);

while group.merge(0.5) {}

for cluster in group.get_clusters() {
    println!(
        "{}: {} members, score {}",
        cluster.id(),
        cluster.len(),
        cluster.score()
    );
}
```
*/

#![deny(missing_docs)]

mod cluster;
mod error;
mod group;
mod method;
mod natural;
mod queue;
mod reader;
mod similarity;

pub use crate::cluster::Cluster;
pub use crate::error::{Error, Result};
pub use crate::group::ClusterGroup;
pub use crate::method::LinkageMethod;
pub use crate::reader::{Column, ClusterReader, ReadStats};
pub use crate::similarity::Similarity;

//! The three linkage criteria and their pure arithmetic update formulas.

use std::str::FromStr;

use crate::error::Error;

/// A method for computing similarities between clusters.
///
/// When clusters `A` and `B` merge into a new cluster `AB`, the method
/// selected dictates two things: how the similarity between `AB` and every
/// other cluster `X` is derived from the old `A`-`X` and `B`-`X` similarities
/// ([`LinkageMethod::merged_sim`]), and how `AB`'s own internal cohesion
/// score is derived from `A`'s and `B`'s prior internal scores plus the
/// `A`-`B` similarity that triggered the merge ([`LinkageMethod::merged_score`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LinkageMethod {
    /// Assigns the minimum similarity between all pairs of observations.
    ///
    /// If `AB` is a newly merged cluster and `X` is any other cluster, the
    /// similarity between `AB` and `X` is `min(A-X, B-X)`.
    Complete,
    /// Assigns the maximum similarity between all pairs of observations.
    ///
    /// If `AB` is a newly merged cluster and `X` is any other cluster, the
    /// similarity between `AB` and `X` is `max(A-X, B-X)`.
    Single,
    /// Assigns the size-weighted average similarity between all pairs of
    /// observations.
    ///
    /// If `AB` is a newly merged cluster and `X` is any other cluster, the
    /// similarity between `AB` and `X` is
    /// `(|A|*(A-X) + |B|*(B-X)) / (|A| + |B|)`.
    Average,
}

impl LinkageMethod {
    /// Compute the similarity between a newly merged cluster `A ∪ B` and a
    /// third cluster `X`, given the pre-merge similarities `ax = A-X` and
    /// `bx = B-X` and the three clusters' sizes.
    ///
    /// `ab` (the similarity that triggered the merge) and `size_x` are
    /// accepted for symmetry with the spec's description of this operation
    /// but are unused by all three current variants.
    pub fn merged_sim(
        self,
        _ab: f64,
        ax: f64,
        bx: f64,
        size_a: usize,
        size_b: usize,
        _size_x: usize,
    ) -> f64 {
        match self {
            LinkageMethod::Complete => ax.min(bx),
            LinkageMethod::Single => ax.max(bx),
            LinkageMethod::Average => {
                let size_a = size_a as f64;
                let size_b = size_b as f64;
                (size_a * ax + size_b * bx) / (size_a + size_b)
            }
        }
    }

    /// Compute the internal cohesion score of a newly merged cluster `A ∪ B`,
    /// given `A`'s and `B`'s pre-merge internal scores and the similarity
    /// `ab` between them that triggered the merge.
    pub fn merged_score(self, a: f64, b: f64, ab: f64, size_a: usize, size_b: usize) -> f64 {
        match self {
            LinkageMethod::Complete => a.min(b).min(ab),
            LinkageMethod::Single => {
                let mut r = ab;
                if size_a > 1 {
                    r = r.max(a);
                }
                if size_b > 1 {
                    r = r.max(b);
                }
                r
            }
            LinkageMethod::Average => {
                let mut r = ab;
                let mut n = (size_a * size_b) as f64;
                if size_a > 1 {
                    let t = (size_a * (size_a - 1)) as f64 / 2.0;
                    r = (r * n + a * t) / (n + t);
                    n += t;
                }
                if size_b > 1 {
                    let t = (size_b * (size_b - 1)) as f64 / 2.0;
                    r = (r * n + b * t) / (n + t);
                }
                r
            }
        }
    }
}

impl FromStr for LinkageMethod {
    type Err = Error;

    /// Parse a linkage method name, case-insensitively: `"complete"`,
    /// `"single"`, or `"average"`.
    fn from_str(name: &str) -> Result<LinkageMethod, Error> {
        match name.to_ascii_lowercase().as_str() {
            "complete" => Ok(LinkageMethod::Complete),
            "single" => Ok(LinkageMethod::Single),
            "average" => Ok(LinkageMethod::Average),
            _ => Err(Error::InvalidMethod(name.to_string())),
        }
    }
}

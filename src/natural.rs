//! A "natural sort" comparator for cluster identifiers.
//!
//! Plain lexicographic order puts `"item10"` before `"item9"`, which reads
//! poorly to a human skimming a sorted cluster listing. Natural sort instead
//! lexes each identifier into maximal runs of digits and non-digits and
//! compares digit runs numerically, so `"item9"` sorts before `"item10"`.

use std::cmp::Ordering;

/// Compare two identifiers using natural sort.
///
/// The identifiers are split into maximal runs of ASCII digits and
/// non-digits. Corresponding runs are compared: digit runs numerically
/// (leading zeros are not significant), other runs by codepoint. The first
/// run pair that differs determines the result.
///
/// Natural sort can rank two *distinct* strings as equal (`"007"` and `"7"`
/// both carry the numeric value `7` in their only run). Since cluster ids
/// are compared for equality as plain strings elsewhere, this function falls
/// back to a plain string comparison whenever the run-wise comparison is
/// exhausted without finding a difference. This keeps the ordering total and
/// keeps `compare(a, b) == Ordering::Equal` equivalent to `a == b`.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut ac = a.chars().peekable();
    let mut bc = b.chars().peekable();

    loop {
        match (ac.peek(), bc.peek()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&ca), Some(&cb)) => {
                let ordering = if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let na = take_number(&mut ac);
                    let nb = take_number(&mut bc);
                    na.cmp(&nb)
                } else {
                    let ra = take_run(&mut ac);
                    let rb = take_run(&mut bc);
                    ra.cmp(&rb)
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Consume a maximal run of ASCII digits and return its numeric value.
///
/// Overly long digit runs saturate at `u128::MAX` rather than overflow; this
/// only affects identifiers with implausibly long numeric runs, and
/// saturating still produces a total, if slightly degenerate, order among
/// them.
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> u128 {
    let mut value: u128 = 0;
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        chars.next();
        value = value
            .saturating_mul(10)
            .saturating_add(c.to_digit(10).unwrap() as u128);
    }
    value
}

/// Consume a maximal run of non-digit characters and return it.
fn take_run(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            break;
        }
        chars.next();
        run.push(c);
    }
    run
}

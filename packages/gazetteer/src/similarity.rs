//! String similarity scores on a 0–100 integer scale.
//!
//! Built on [`rapidfuzz::fuzz::ratio`] (indel similarity) and composed the
//! way fuzzywuzzy's `WRatio` composes it: plain, partial (best-aligned
//! substring), token-sort and token-set variants, with the partial family
//! only used when one side is much longer than the other.
//!
//! All functions take **normalized** input (see
//! [`crate::normalize::normalize`]). Every intermediate score is rounded to
//! an integer, half to even.

use std::collections::BTreeSet;

use crate::normalize::sorted_tokens;

/// Weight applied to token-based scores relative to the plain ratio.
const UNBASE_SCALE: f64 = 0.95;

/// Weight applied to partial scores when lengths differ by 1.5x or more.
const PARTIAL_SCALE: f64 = 0.90;

/// Weight applied to partial scores when lengths differ by more than 8x.
const LONG_PARTIAL_SCALE: f64 = 0.60;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    to_score(100.0 * rapidfuzz::fuzz::ratio(a.iter().copied(), b.iter().copied()))
}

/// Indel similarity `2 * LCS / (len(a) + len(b))`. Empty input scores 0.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against every alignment of it over
/// the longer one. Alignments may run off the end of the longer string but
/// never start before it.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return 0;
    }

    let n = short.len();
    let m = long.len();

    let full = (0..=m - n).map(|start| &long[start..start + n]);
    let tails = (m - n + 1..m).map(|start| &long[start..]);

    let mut best = 0;
    for window in full.chain(tails) {
        best = best.max(ratio_chars(short, window));
        if best == 100 {
            break;
        }
    }
    best
}

/// [`ratio`] after sorting each side's tokens, so word order is ignored.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compares the shared tokens against each side's full token set, so extra
/// words on one side cost little.
fn token_set_with(a: &str, b: &str, score: fn(&str, &str) -> u8) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let shared = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{shared} {only_a}").trim().to_string();
    let combined_b = format!("{shared} {only_b}").trim().to_string();

    score(&shared, &combined_a)
        .max(score(&shared, &combined_b))
        .max(score(&combined_a, &combined_b))
}

/// Token-set similarity using [`ratio`].
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, ratio)
}

fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, partial_ratio)
}

/// fuzzywuzzy's `WRatio`: the best of the plain ratio and scaled
/// token/partial variants.
///
/// With lengths within 1.5x of each other, token-sort and token-set scores
/// weighted by 0.95 compete with [`ratio`]. Otherwise partial scores
/// weighted by 0.9 (0.6 beyond 8x) compete instead, and their token
/// variants are additionally weighted by 0.95.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let base = f64::from(ratio(a, b));

    let best = if len_ratio < 1.5 {
        base.max(f64::from(token_sort_ratio(a, b)) * UNBASE_SCALE)
            .max(f64::from(token_set_ratio(a, b)) * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio > 8.0 {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        base.max(f64::from(partial_ratio(a, b)) * partial_scale)
            .max(f64::from(partial_token_sort_ratio(a, b)) * UNBASE_SCALE * partial_scale)
            .max(f64::from(partial_token_set_ratio(a, b)) * UNBASE_SCALE * partial_scale)
    };

    to_score(best)
}

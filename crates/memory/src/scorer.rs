//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! The longest common contiguous block is matched first, then the same search
//! recurses on the unmatched text to its left and to its right.  With `M`
//! matched characters the ratio is `2·M / (len(a) + len(b))`.
use std::collections::HashMap;

/// Similarity in `[0, 1]`; `1.0` for identical strings (including two empty
/// strings), `0.0` when nothing matches.  Lengths are counted in `char`s.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        positions.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the given ranges.
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of the match ending at b[j], keyed by j, for the previous row
    let mut prev: HashMap<usize, usize> = HashMap::new();
    let mut next: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        next.clear();
        if let Some(js) = positions.get(ch) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let run = j
                    .checked_sub(1)
                    .and_then(|pj| prev.get(&pj))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, run);
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
            }
        }
        std::mem::swap(&mut prev, &mut next);
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::similarity_ratio;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(approx(similarity_ratio("database_host", "database_host"), 1.0));
        assert!(approx(similarity_ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_or_empty_side_scores_zero() {
        assert!(approx(similarity_ratio("abc", "xyz"), 0.0));
        assert!(approx(similarity_ratio("abc", ""), 0.0));
    }

    #[test]
    fn prefix_match_counts_shared_characters() {
        // "database" (8) inside "database_host" (13): 2·8 / 21
        assert!(approx(similarity_ratio("database", "database_host"), 16.0 / 21.0));
    }

    #[test]
    fn recursion_picks_up_blocks_on_both_sides() {
        // longest block "bcd", then nothing left of it in b, "e" vs "" right
        assert!(approx(similarity_ratio("abcd", "bcde"), 0.75));
        // "ab" + "d": 2·3 / 8
        assert!(approx(similarity_ratio("abxd", "abyd"), 0.75));
    }

    #[test]
    fn simple_pairs_are_symmetric() {
        let pairs = [("favorite color", "favourite_color"), ("abcd", "bcde"), ("api", "api key")];
        for (a, b) in pairs {
            assert!(approx(similarity_ratio(a, b), similarity_ratio(b, a)), "{a} / {b}");
        }
    }

    #[test]
    fn counts_chars_not_bytes() {
        // é is two bytes; one of four chars differs on each side
        assert!(approx(similarity_ratio("café", "cafe"), 0.75));
    }
}

//! Longest common subsequence over arbitrary token slices.

/// Compute the longest common subsequence of two token sequences.
///
/// Classic quadratic DP. Reconstruction walks from `(m, n)` backwards:
/// matching tokens move diagonally; otherwise the walk moves up (toward
/// smaller `i`) only when `dp[i-1][j]` is strictly greater, defaulting to
/// moving left on ties. The tie-break is load-bearing: it fixes whether
/// neighboring delete/add pairs come out as delete-then-add.
pub fn longest_common_subsequence<T: PartialEq + Clone>(seq1: &[T], seq2: &[T]) -> Vec<T> {
    let m = seq1.len();
    let n = seq2.len();
    let mut dp = vec![vec![0u32; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if seq1[i - 1] == seq2[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut lcs = Vec::with_capacity(dp[m][n] as usize);
    let mut i = m;
    let mut j = n;
    while i > 0 && j > 0 {
        if seq1[i - 1] == seq2[j - 1] {
            lcs.push(seq1[i - 1].clone());
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    lcs.reverse();
    lcs
}

/// Calculate factorial (cached for small values)
pub(crate) const FACTORIAL_LIMIT: usize = 21;
pub(crate) const FACTORIALS: [u64; FACTORIAL_LIMIT] = {
    let mut facts = [1u64; FACTORIAL_LIMIT];
    let mut i = 1;
    while i < FACTORIAL_LIMIT {
        facts[i] = facts[i - 1] * (i as u64);
        i += 1;
    }
    facts
};

pub(crate) fn factorial(n: usize) -> f64 {
    if n < FACTORIAL_LIMIT {
        FACTORIALS[n] as f64
    } else {
        // Use Stirling's approximation for large n
        let n_f64 = n as f64;
        (2.0 * std::f64::consts::PI * n_f64).sqrt() * (n_f64 / std::f64::consts::E).powf(n_f64)
    }
}

/// Step `perm` to the next permutation in lexicographic order.
///
/// Returns `false` (leaving `perm` untouched) once the last permutation has been reached.
pub(crate) fn next_permutation(perm: &mut [usize]) -> bool {
    if perm.len() < 2 {
        return false;
    }

    // Longest non-increasing suffix starts right after the pivot
    let Some(pivot) = (0..perm.len() - 1).rev().find(|&i| perm[i] < perm[i + 1]) else {
        return false;
    };

    let mut successor = perm.len() - 1;
    while perm[successor] <= perm[pivot] {
        successor -= 1;
    }

    perm.swap(pivot, successor);
    perm[pivot + 1..].reverse();
    true
}

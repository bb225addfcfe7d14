//! Naive recursive Fibonacci used as a CPU burner.
//!
//! The call count grows as roughly φ^n, so the index is a direct knob on
//! how long a request holds its execution context. Rough timings on
//! typical hardware: n≈35 takes 1-2s, n≈40 tens of seconds, n≈42 minutes.

/// Largest index whose value fits in a `u64` (fib(93) = 12200160415121876738).
pub const MAX_REPRESENTABLE_FIB_INDEX: u32 = 93;

/// Computes fib(n) with `fib(n) = fib(n-1) + fib(n-2)`, no memoization.
///
/// Callers must keep `n <= MAX_REPRESENTABLE_FIB_INDEX`.
pub fn fib(n: u32) -> u64 {
    if n < 2 {
        return n as u64;
    }
    fib(n - 1) + fib(n - 2)
}

#[cfg(test)]
pub(crate) fn reference_fib(n: u32) -> u64 {
    if n == 0 {
        return 0;
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        let next = a + b;
        a = b;
        b = next;
    }
    b
}

use itertools::izip;
use rand::Rng;
use rand_distr::{Distribution, StandardUniform};

/// Piecewise-linear interpolation of `fp(xp)` at `x`.
///
/// `xp` must be non-decreasing. Values outside `[xp[0], xp[last]]` are
/// clamped to the end values. Within a run of equal `xp` entries the
/// rightmost one wins, so a flat cumulative profile never divides by zero.
#[inline]
pub(crate) fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    debug_assert!(!xp.is_empty());

    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }

    // First index with xp[hi] > x. Both neighbours exist because of the
    // clamping above.
    let hi = xp.partition_point(|&val| val <= x);
    let lo = hi - 1;
    let t = (x - xp[lo]) / (xp[hi] - xp[lo]);
    fp[lo] + t * (fp[hi] - fp[lo])
}

pub(crate) fn interp_into(x: &[f64], xp: &[f64], fp: &[f64], out: &mut [f64]) {
    debug_assert_eq!(x.len(), out.len());
    izip!(x, out).for_each(|(&x, out)| *out = interp(x, xp, fp));
}

/// `n` draws from `[0, 1)`, consumed from `rng` in order.
pub(crate) fn uniforms<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    (0..n).map(|_| StandardUniform.sample(rng)).collect()
}

/// `sum(a * b)`
#[inline]
pub(crate) fn weighted_sum(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    izip!(a, b).map(|(a, b)| a * b).sum()
}

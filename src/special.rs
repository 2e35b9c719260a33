//! Special functions that appear in the distribution function and its
//! angular marginal.

use ::special::Gamma;
use std::f64::consts::PI;

const FRAC_1_SQRT_PI: f64 = 0.564_189_583_547_756_3;

/// Spacing of the sampled Gaussian in Rybicki's method. Truncation error
/// scales like `exp(-(pi / 2h)^2)`, which is far below f64 resolution here.
const DAWSON_H: f64 = 0.2;
const DAWSON_NMAX: usize = 16;

/// `exp(e) * P(s, e)`, with `P` the lower regularized incomplete gamma
/// function. For `s == 0` this is `exp(e)`.
///
/// This is the energy dependence of the lowered-isothermal family: `s = 0`
/// is the Woolley model, `s = 1` the King model (`exp(e) - 1`) and `s = 2`
/// the Wilson model.
pub fn eg(e: f64, s: f64) -> f64 {
    if s > 0. {
        if e <= 0. {
            return 0.;
        }
        e.exp() * e.inc_gamma(s)
    } else {
        e.exp()
    }
}

/// Dawson's integral `D(x) = exp(-x^2) * int_0^x exp(t^2) dt`.
///
/// Small arguments use the Maclaurin series, everything else Rybicki's
/// exponentially convergent sum.
pub fn dawson(x: f64) -> f64 {
    if !x.is_finite() {
        return if x.is_nan() { x } else { 0. };
    }

    let ax = x.abs();
    if ax < 0.2 {
        // Coefficients (-2)^n / (2n+1)!!
        let x2 = x * x;
        let poly = 1.
            + x2 * (-2. / 3.
                + x2 * (4. / 15.
                    + x2 * (-8. / 105.
                        + x2 * (16. / 945. + x2 * (-32. / 10395. + x2 * (64. / 135135.))))));
        return x * poly;
    }

    // Nearest even multiple of h.
    let n0 = 2. * (0.5 * ax / DAWSON_H).round();
    let xp = ax - n0 * DAWSON_H;
    let mut e1 = (2. * xp * DAWSON_H).exp();
    let e2 = e1 * e1;
    let mut d1 = n0 + 1.;
    let mut d2 = d1 - 2.;
    let mut sum = 0.;
    for i in 0..DAWSON_NMAX {
        let c = -(((2 * i + 1) as f64) * DAWSON_H).powi(2);
        sum += c.exp() * (e1 / d1 + 1. / (d2 * e1));
        d1 += 2.;
        d2 -= 2.;
        e1 *= e2;
    }
    FRAC_1_SQRT_PI * x.signum() * (-xp * xp).exp() * sum
}

/// Imaginary error function `erfi(x) = -i erf(ix)`.
///
/// Overflows for `|x|` beyond about 26. Use [`erfi_ratio`] when only a ratio
/// is needed.
pub fn erfi(x: f64) -> f64 {
    2. / PI.sqrt() * (x * x).exp() * dawson(x)
}

/// `erfi(a * q) / erfi(a)` for `q` in `[0, 1]`, evaluated through Dawson's
/// integral so that large `a` does not overflow. Tends to `q` as `a -> 0`.
pub fn erfi_ratio(a: f64, q: f64) -> f64 {
    if a.abs() < 1e-8 {
        return q;
    }
    let aq = a * q;
    ((aq * aq - a * a).exp()) * dawson(aq) / dawson(a)
}

/// `D(z) / z`, continuous through `z = 0`.
#[inline]
pub fn dawson_over_arg(z: f64) -> f64 {
    if z.abs() < 1e-8 {
        1.
    } else {
        dawson(z) / z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn eg_king_is_exp_minus_one() {
        for &e in &[0.01, 0.5, 1., 3., 9.] {
            assert_relative_eq!(eg(e, 1.), e.exp() - 1., max_relative = 1e-8);
        }
    }

    #[test]
    fn eg_woolley_is_exp() {
        assert_relative_eq!(eg(2., 0.), 2f64.exp());
        assert_relative_eq!(eg(-1., 0.), (-1f64).exp());
    }

    #[test]
    fn eg_half_matches_erf() {
        // P(1/2, x) = erf(sqrt(x))
        assert_relative_eq!(eg(1., 0.5), 1f64.exp() * 0.842_700_792_949_714_9, max_relative = 1e-8);
    }

    #[test]
    fn eg_vanishes_at_zero_energy() {
        assert_eq!(eg(0., 1.), 0.);
        assert_eq!(eg(-0.5, 2.), 0.);
    }

    #[test]
    fn dawson_reference_values() {
        assert_relative_eq!(dawson(0.1), 0.099_335_992_397_852_86, max_relative = 1e-12);
        assert_relative_eq!(dawson(0.5), 0.424_436_383_502_022_3, max_relative = 1e-12);
        assert_relative_eq!(dawson(1.), 0.538_079_506_912_768_4, max_relative = 1e-12);
        assert_relative_eq!(dawson(2.), 0.301_340_388_923_792, max_relative = 1e-12);
        assert_relative_eq!(dawson(-1.), -0.538_079_506_912_768_4, max_relative = 1e-12);
        assert_eq!(dawson(0.), 0.);
    }

    #[test]
    fn dawson_large_argument_asymptote() {
        // D(x) ~ 1/(2x) + 1/(4x^3)
        let x = 50.;
        assert_relative_eq!(dawson(x), 0.5 / x + 0.25 / x.powi(3), max_relative = 1e-6);
    }

    #[test]
    fn erfi_reference_values() {
        assert_relative_eq!(erfi(0.5), 0.614_952_094_696_511, max_relative = 1e-12);
        assert_relative_eq!(erfi(1.), 1.650_425_758_797_543, max_relative = 1e-12);
    }

    #[test]
    fn erfi_ratio_endpoints() {
        assert_relative_eq!(erfi_ratio(3., 1.), 1.);
        assert_eq!(erfi_ratio(3., 0.), 0.);
        assert_eq!(erfi_ratio(0., 0.3), 0.3);
        assert!(erfi_ratio(40., 0.5).is_finite());
    }

    proptest! {
        #[test]
        fn dawson_series_joins_sum(x in 0.15f64..0.25f64) {
            // Both branches are accurate to near machine precision, so the
            // switch at 0.2 must be invisible.
            let y = x + 1e-9;
            prop_assert!((dawson(y) - dawson(x)).abs() < 1e-8);
        }

        #[test]
        fn erfi_ratio_matches_direct(a in 0.05f64..5f64, q in 0f64..1f64) {
            let direct = erfi(a * q) / erfi(a);
            prop_assert!((erfi_ratio(a, q) - direct).abs() < 1e-10);
        }

        #[test]
        fn erfi_ratio_is_monotone(a in 0.01f64..20f64, q1 in 0f64..1f64, q2 in 0f64..1f64) {
            let (lo, hi) = if q1 < q2 { (q1, q2) } else { (q2, q1) };
            prop_assert!(erfi_ratio(a, lo) <= erfi_ratio(a, hi) + 1e-15);
        }
    }
}

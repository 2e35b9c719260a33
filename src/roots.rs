//! Bracketing scalar root finding.

/// Tolerances for [`brentq`].
#[derive(Debug, Clone, Copy)]
pub struct BrentOptions {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iter: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        BrentOptions {
            xtol: 2e-12,
            rtol: 4. * f64::EPSILON,
            max_iter: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootError {
    /// `f(a)` and `f(b)` have the same sign.
    NotBracketed,
    /// The iteration limit was hit; carries the last iterate.
    MaxIterations(f64),
}

/// Brent's method on the bracket `[a, b]`.
///
/// Combines bisection with secant and inverse quadratic interpolation steps
/// and never leaves the current bracket.
pub fn brentq<F>(f: F, a: f64, b: f64, options: BrentOptions) -> Result<f64, RootError>
where
    F: Fn(f64) -> f64,
{
    let BrentOptions {
        xtol,
        rtol,
        max_iter,
    } = options;

    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);
    let mut xblk = 0.;
    let mut fblk = 0.;
    let mut spre = 0.;
    let mut scur = 0.;

    if fpre == 0. {
        return Ok(xpre);
    }
    if fcur == 0. {
        return Ok(xcur);
    }
    if fpre.signum() == fcur.signum() {
        return Err(RootError::NotBracketed);
    }

    for _ in 0..max_iter {
        if fpre != 0. && fcur != 0. && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            scur = xcur - xpre;
            spre = scur;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (xtol + rtol * xcur.abs()) / 2.;
        let sbis = (xblk - xcur) / 2.;
        if fcur == 0. || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2. * stry.abs() < spre.abs().min(3. * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else if sbis > 0. {
            xcur += delta;
        } else {
            xcur -= delta;
        }
        fcur = f(xcur);
    }
    Err(RootError::MaxIterations(xcur))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn finds_sqrt_two() {
        let root = brentq(|x| x * x - 2., 0., 2., BrentOptions::default()).unwrap();
        assert_abs_diff_eq!(root, 2f64.sqrt(), epsilon = 1e-11);
    }

    #[test]
    fn endpoint_roots_are_returned_directly() {
        let opts = BrentOptions::default();
        assert_eq!(brentq(|x| x, 0., 1., opts), Ok(0.));
        assert_eq!(brentq(|x| x - 1., 0., 1., opts), Ok(1.));
    }

    #[test]
    fn rejects_missing_bracket() {
        let res = brentq(|x| x * x + 1., -1., 1., BrentOptions::default());
        assert_eq!(res, Err(RootError::NotBracketed));
    }

    #[test]
    fn reports_iteration_limit() {
        let opts = BrentOptions {
            max_iter: 1,
            ..Default::default()
        };
        let res = brentq(|x| x.powi(3) - 0.3, 0., 1., opts);
        assert!(matches!(res, Err(RootError::MaxIterations(_))));
    }

    proptest! {
        #[test]
        fn solves_monotone_cubic(c in 0.001f64..0.999f64) {
            let root = brentq(|x| x.powi(3) + x - 2. * c, 0., 1., BrentOptions::default()).unwrap();
            prop_assert!((root.powi(3) + root - 2. * c).abs() < 1e-10);
        }
    }
}

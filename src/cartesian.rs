//! Projection of radial samples onto Cartesian coordinates.

use std::f64::consts::TAU;

use itertools::izip;
use rand::Rng;

use crate::math::uniforms;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cartesian {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub vz: Vec<f64>,
}

/// Points of length `len` in uniformly random directions.
///
/// The first coordinate is uniform in `[-len, len]` and the remainder is
/// spread over a circle with a uniform azimuth. Consumes all `u1` draws and
/// then all `u2` draws.
fn isotropic<R: Rng + ?Sized>(len: &[f64], rng: &mut R) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = len.len();
    let u1 = uniforms(rng, n);
    let u2 = uniforms(rng, n);

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    for (&l, u1, u2) in izip!(len, u1, u2) {
        let a = (1. - 2. * u1) * l;
        let rho = (l * l - a * a).max(0.).sqrt();
        let (s, c) = (TAU * u2).sin_cos();
        x.push(a);
        y.push(rho * c);
        z.push(rho * s);
    }
    (x, y, z)
}

/// Place particles on spheres of radius `r` and orient their velocities.
///
/// Isotropic systems draw velocity directions the same way as positions.
/// Anisotropic systems keep the sampled radial component and rotate the
/// tangential speed by a uniform azimuth in the local spherical basis.
pub(crate) fn to_cartesian<R: Rng + ?Sized>(
    r: &[f64],
    v: &[f64],
    vr: &[f64],
    vt: &[f64],
    anisotropic: bool,
    rng: &mut R,
) -> Cartesian {
    let (x, y, z) = isotropic(r, rng);

    let (vx, vy, vz) = if anisotropic {
        let n = r.len();
        let u = uniforms(rng, n);
        let mut vx = Vec::with_capacity(n);
        let mut vy = Vec::with_capacity(n);
        let mut vz = Vec::with_capacity(n);
        for (&r, &x, &y, &z, &vr, &vt, u) in izip!(r, &x, &y, &z, vr, vt, u) {
            let (s, c) = (TAU * u).sin_cos();
            let vphi = vt * c;
            let vtheta = vt * s;

            let theta = if r > 0. { (z / r).clamp(-1., 1.).acos() } else { 0. };
            let phi = y.atan2(x);
            let (st, ct) = theta.sin_cos();
            let (sp, cp) = phi.sin_cos();

            vx.push(vr * st * cp + vtheta * ct * cp - vphi * sp);
            vy.push(vr * st * sp + vtheta * ct * sp + vphi * cp);
            vz.push(vr * ct - vtheta * st);
        }
        (vx, vy, vz)
    } else {
        isotropic(v, rng)
    };

    Cartesian {
        x,
        y,
        z,
        vx,
        vy,
        vz,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn norm(a: f64, b: f64, c: f64) -> f64 {
        (a * a + b * b + c * c).sqrt()
    }

    #[test]
    fn positions_lie_on_spheres() {
        let r: Vec<f64> = (0..200).map(|i| 0.01 * i as f64).collect();
        let v = vec![1.; 200];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = to_cartesian(&r, &v, &v, &vec![0.; 200], false, &mut rng);
        for i in 0..200 {
            assert_relative_eq!(norm(out.x[i], out.y[i], out.z[i]), r[i], epsilon = 1e-12);
            assert_relative_eq!(norm(out.vx[i], out.vy[i], out.vz[i]), 1., epsilon = 1e-12);
        }
    }

    #[test]
    fn anisotropic_velocity_keeps_radial_part() {
        let n = 300;
        let r = vec![0.7; n];
        let vr: Vec<f64> = (0..n).map(|i| -1. + 2. * i as f64 / n as f64).collect();
        let vt = vec![0.5f64; n];
        let v: Vec<f64> = vr.iter().zip(&vt).map(|(a, b)| (a * a + b * b).sqrt()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let out = to_cartesian(&r, &v, &vr, &vt, true, &mut rng);

        for i in 0..n {
            let speed = norm(out.vx[i], out.vy[i], out.vz[i]);
            assert_relative_eq!(speed, v[i], epsilon = 1e-12);
            let radial = (out.x[i] * out.vx[i] + out.y[i] * out.vy[i] + out.z[i] * out.vz[i]) / r[i];
            assert_relative_eq!(radial, vr[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn centre_particle_stays_finite() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = to_cartesian(&[0.], &[1.], &[0.5], &[0.5], true, &mut rng);
        assert_eq!((out.x[0], out.y[0], out.z[0]), (0., 0., 0.));
        assert!(out.vx[0].is_finite() && out.vy[0].is_finite() && out.vz[0].is_finite());
    }
}

//! Profile resampling with a cubic smoothing spline
//!
//! Field samples are irregular and noisy. The resampler fits a penalised
//! cubic spline through them (Reinsch's algorithm) and evaluates it on the
//! observation grid, so the observed and modelled curves are compared at the
//! same abscissas.
//!
//! The smoothing condition bounds the residual sum of squares at the knots:
//! the smoothest spline with `RSS <= s` is chosen. `s = 0` interpolates,
//! large `s` tends to the least-squares straight line. By default `s` is the
//! number of samples.

use gravpoly_core::error::{GravpolyError, Result};
use gravpoly_core::models::{ObservationGrid, Profile, MIN_PROFILE_SAMPLES};

/// Upper limit on halvings of the log-penalty bracket
const MAX_BISECTIONS: usize = 200;

/// Decades searched on each side of the starting penalty
const MAX_BRACKET_STEPS: usize = 40;

/// Relative tolerance on the achieved residual sum of squares
const RSS_TOLERANCE: f64 = 1e-9;

/// Fits profiles and evaluates them on observation grids
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfileResampler {
    /// Target residual sum of squares; `None` uses the number of samples
    pub smoothing: Option<f64>,
}

impl ProfileResampler {
    pub fn new(smoothing: Option<f64>) -> Self {
        Self { smoothing }
    }

    /// Observed gravity at every grid point, mGal
    pub fn resample(&self, profile: &Profile, grid: &ObservationGrid) -> Result<Vec<f64>> {
        let spline =
            SmoothingSpline::fit(&profile.distances(), &profile.gravity(), self.smoothing)?;
        tracing::debug!(
            samples = profile.len(),
            grid_points = grid.len(),
            rss = spline.rss(),
            "Resampled profile"
        );
        Ok(grid.iter().map(|x| spline.evaluate(x)).collect())
    }
}

/// Resample with the default smoothing condition
pub fn resample(profile: &Profile, grid: &ObservationGrid) -> Result<Vec<f64>> {
    ProfileResampler::default().resample(profile, grid)
}

/// Natural cubic smoothing spline in value / second-derivative form.
///
/// Knots are kept on a normalised `[0, 1]` axis so the penalty weight is
/// independent of the distance units.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingSpline {
    origin: f64,
    scale: f64,
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivatives at the knots, zero at both ends
    curvature: Vec<f64>,
    rss: f64,
}

impl SmoothingSpline {
    /// Fit `y(x)` under the smoothing condition `RSS <= smoothing`
    pub fn fit(x: &[f64], y: &[f64], smoothing: Option<f64>) -> Result<Self> {
        validate_samples(x, y)?;

        let n = x.len();
        let target = smoothing.unwrap_or(n as f64);
        if !target.is_finite() || target < 0.0 {
            return Err(GravpolyError::ConfigInvalid {
                key: "smoothing".to_string(),
                reason: format!("must be non-negative, got {}", target),
            });
        }

        let origin = x[0];
        let scale = x[n - 1] - x[0];
        let t: Vec<f64> = x.iter().map(|xi| (xi - origin) / scale).collect();
        let system = PenaltySystem::new(&t, y);

        let (values, curvature) = if target == 0.0 {
            system.solve(0.0)
        } else {
            let line = least_squares_line(&t, y);
            let line_rss = rss(y, &line);
            if line_rss <= target {
                tracing::debug!(line_rss, target, "Smoothing condition met by a straight line");
                (line, vec![0.0; n])
            } else {
                let alpha = system.penalty_for(target);
                tracing::debug!(alpha, target, "Selected spline penalty");
                system.solve(alpha)
            }
        };

        let rss = rss(y, &values);
        Ok(Self { origin, scale, knots: t, values, curvature, rss })
    }

    /// Residual sum of squares at the knots
    pub fn rss(&self) -> f64 {
        self.rss
    }

    /// Smoothed values at the knots
    pub fn knot_values(&self) -> &[f64] {
        &self.values
    }

    /// Spline value at `x`; linear beyond the outer knots
    pub fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.origin) / self.scale;
        let n = self.knots.len();
        let (k, g, c) = (&self.knots, &self.values, &self.curvature);

        if t <= k[0] {
            let h = k[1] - k[0];
            let slope = (g[1] - g[0]) / h - h * c[1] / 6.0;
            return g[0] + slope * (t - k[0]);
        }
        if t >= k[n - 1] {
            let h = k[n - 1] - k[n - 2];
            let slope = (g[n - 1] - g[n - 2]) / h + h * c[n - 2] / 6.0;
            return g[n - 1] + slope * (t - k[n - 1]);
        }

        let i = k.partition_point(|&knot| knot <= t).saturating_sub(1).min(n - 2);
        let h = k[i + 1] - k[i];
        let a = t - k[i];
        let b = k[i + 1] - t;

        (a * g[i + 1] + b * g[i]) / h
            - a * b / 6.0 * ((1.0 + a / h) * c[i + 1] + (1.0 + b / h) * c[i])
    }
}

fn validate_samples(x: &[f64], y: &[f64]) -> Result<()> {
    if x.is_empty() {
        return Err(GravpolyError::EmptyInput { what: "spline samples".to_string() });
    }
    if x.len() != y.len() {
        return Err(GravpolyError::GridInvalid {
            reason: format!("{} distances but {} gravity values", x.len(), y.len()),
        });
    }
    if x.len() < MIN_PROFILE_SAMPLES {
        return Err(GravpolyError::ProfileTooShort {
            found: x.len(),
            required: MIN_PROFILE_SAMPLES,
        });
    }
    if let Some(index) = x.iter().zip(y).position(|(a, b)| !a.is_finite() || !b.is_finite()) {
        return Err(GravpolyError::NonFiniteValue { what: "spline sample".to_string(), index });
    }
    if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(GravpolyError::NonMonotonicDistance {
            index: index + 1,
            previous: x[index],
            current: x[index + 1],
        });
    }
    Ok(())
}

fn rss(y: &[f64], fitted: &[f64]) -> f64 {
    y.iter().zip(fitted).map(|(a, b)| (a - b) * (a - b)).sum()
}

fn least_squares_line(t: &[f64], y: &[f64]) -> Vec<f64> {
    let n = t.len() as f64;
    let mean_t = t.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxy: f64 = t.iter().zip(y).map(|(ti, yi)| (ti - mean_t) * (yi - mean_y)).sum();
    let sxx: f64 = t.iter().map(|ti| (ti - mean_t) * (ti - mean_t)).sum();
    let slope = sxy / sxx;
    t.iter().map(|ti| mean_y + slope * (ti - mean_t)).collect()
}

/// Banded pieces of the Reinsch system `(R + αQᵀQ) γ = Qᵀy`.
///
/// `Q` is the `n × (n-2)` second-difference matrix, `R` the tridiagonal
/// integral-of-curvature matrix.
struct PenaltySystem<'a> {
    y: &'a [f64],
    /// Column `j` of `Q`: rows `j`, `j + 1`, `j + 2`
    q: Vec<[f64; 3]>,
    r_diag: Vec<f64>,
    r_off: Vec<f64>,
    qty: Vec<f64>,
}

impl<'a> PenaltySystem<'a> {
    fn new(t: &[f64], y: &'a [f64]) -> Self {
        let h: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
        let m = t.len() - 2;

        let q: Vec<[f64; 3]> = (0..m)
            .map(|j| [1.0 / h[j], -1.0 / h[j] - 1.0 / h[j + 1], 1.0 / h[j + 1]])
            .collect();
        let r_diag = (0..m).map(|j| (h[j] + h[j + 1]) / 3.0).collect();
        let r_off = (0..m.saturating_sub(1)).map(|j| h[j + 1] / 6.0).collect();
        let qty = q
            .iter()
            .enumerate()
            .map(|(j, c)| c[0] * y[j] + c[1] * y[j + 1] + c[2] * y[j + 2])
            .collect();

        Self { y, q, r_diag, r_off, qty }
    }

    /// Knot values and full curvature vector for penalty `alpha`
    fn solve(&self, alpha: f64) -> (Vec<f64>, Vec<f64>) {
        let m = self.q.len();
        let q = &self.q;

        let diag: Vec<f64> = (0..m)
            .map(|j| self.r_diag[j] + alpha * (q[j][0] * q[j][0] + q[j][1] * q[j][1] + q[j][2] * q[j][2]))
            .collect();
        let off1: Vec<f64> = (0..m.saturating_sub(1))
            .map(|j| self.r_off[j] + alpha * (q[j][1] * q[j + 1][0] + q[j][2] * q[j + 1][1]))
            .collect();
        let off2: Vec<f64> =
            (0..m.saturating_sub(2)).map(|j| alpha * q[j][2] * q[j + 2][0]).collect();

        let gamma = solve_pentadiagonal(&diag, &off1, &off2, &self.qty);

        let mut values = self.y.to_vec();
        for (j, (col, g)) in q.iter().zip(&gamma).enumerate() {
            for (row, coeff) in col.iter().enumerate() {
                values[j + row] -= alpha * coeff * g;
            }
        }

        let mut curvature = Vec::with_capacity(m + 2);
        curvature.push(0.0);
        curvature.extend_from_slice(&gamma);
        curvature.push(0.0);

        (values, curvature)
    }

    fn rss_at(&self, alpha: f64) -> f64 {
        rss(self.y, &self.solve(alpha).0)
    }

    /// Penalty whose fit has `RSS ≈ target`, by bisection on `ln α`.
    ///
    /// RSS grows monotonically with `α`, from zero at interpolation to the
    /// straight-line residual in the limit.
    fn penalty_for(&self, target: f64) -> f64 {
        let mut lo = 1.0_f64;
        let mut hi = 1.0_f64;

        for _ in 0..MAX_BRACKET_STEPS {
            if self.rss_at(lo) <= target {
                break;
            }
            lo /= 10.0;
        }
        for _ in 0..MAX_BRACKET_STEPS {
            if self.rss_at(hi) >= target {
                break;
            }
            hi *= 10.0;
        }

        if self.rss_at(lo) > target {
            return lo;
        }
        if self.rss_at(hi) < target {
            return hi;
        }

        let (mut log_lo, mut log_hi) = (lo.ln(), hi.ln());
        for _ in 0..MAX_BISECTIONS {
            let mid = 0.5 * (log_lo + log_hi);
            let value = self.rss_at(mid.exp());
            if (value - target).abs() <= RSS_TOLERANCE * target {
                return mid.exp();
            }
            if value > target {
                log_hi = mid;
            } else {
                log_lo = mid;
            }
            if log_hi - log_lo < f64::EPSILON {
                break;
            }
        }

        // Lower end keeps RSS within the target
        log_lo.exp()
    }
}

/// Solve a symmetric positive-definite pentadiagonal system by `LDLᵀ`.
///
/// `off1[i]` is `A[i][i+1]`, `off2[i]` is `A[i][i+2]`.
fn solve_pentadiagonal(diag: &[f64], off1: &[f64], off2: &[f64], rhs: &[f64]) -> Vec<f64> {
    let m = diag.len();
    let mut d = vec![0.0; m];
    let mut l1 = vec![0.0; m];
    let mut l2 = vec![0.0; m];

    for i in 0..m {
        let mut di = diag[i];
        if i >= 1 {
            di -= l1[i - 1] * l1[i - 1] * d[i - 1];
        }
        if i >= 2 {
            di -= l2[i - 2] * l2[i - 2] * d[i - 2];
        }
        d[i] = di;

        if i + 1 < m {
            let mut v = off1[i];
            if i >= 1 {
                v -= l2[i - 1] * l1[i - 1] * d[i - 1];
            }
            l1[i] = v / di;
        }
        if i + 2 < m {
            l2[i] = off2[i] / di;
        }
    }

    let mut z = vec![0.0; m];
    for i in 0..m {
        let mut v = rhs[i];
        if i >= 1 {
            v -= l1[i - 1] * z[i - 1];
        }
        if i >= 2 {
            v -= l2[i - 2] * z[i - 2];
        }
        z[i] = v;
    }

    let mut x = vec![0.0; m];
    for i in (0..m).rev() {
        let mut v = z[i] / d[i];
        if i + 1 < m {
            v -= l1[i] * x[i + 1];
        }
        if i + 2 < m {
            v -= l2[i] * x[i + 2];
        }
        x[i] = v;
    }

    x
}

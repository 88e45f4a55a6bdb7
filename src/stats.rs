//! Exact (Clopper–Pearson) binomial confidence bounds, used by the
//! tournament harness to decide when one player is statistically separated
//! from even.
//!
//! The bounds are the usual inverse regularized incomplete beta quantiles;
//! successes may be fractional because draws count as half a win.

const IBETA_EPS: f64 = 1e-14;
const IBETA_FPMIN: f64 = 1e-300;
const IBETA_MAX_ITER: usize = 300;

/// Lower bound on the success probability `p` after observing `successes`
/// out of `trials`, such that P(X >= successes | p = bound) = alpha.
pub fn lower_bound_on_p(trials: f64, successes: f64, alpha: f64) -> f64 {
    let successes = successes.max(0.0).min(trials);
    if successes <= 0.0 {
        return 0.0;
    }
    inverse_reg_beta(successes, trials - successes + 1.0, alpha)
}

/// Upper bound on the success probability `p` after observing `successes`
/// out of `trials`, such that P(X <= successes | p = bound) = alpha.
pub fn upper_bound_on_p(trials: f64, successes: f64, alpha: f64) -> f64 {
    let successes = successes.max(0.0).min(trials);
    if successes >= trials {
        return 1.0;
    }
    inverse_reg_beta(successes + 1.0, trials - successes, 1.0 - alpha)
}

/// Natural log of the gamma function (Lanczos, g = 7, 9 terms).
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    if x < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = COEFFICIENTS[0];
    for (i, c) in COEFFICIENTS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Continued fraction for the incomplete beta function (Lentz's method).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < IBETA_FPMIN {
        d = IBETA_FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;
    for m in 1..=IBETA_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < IBETA_FPMIN {
            d = IBETA_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < IBETA_FPMIN {
            c = IBETA_FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < IBETA_FPMIN {
            d = IBETA_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < IBETA_FPMIN {
            c = IBETA_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < IBETA_EPS {
            break;
        }
    }
    h
}

/// Regularized incomplete beta function I_x(a, b).
fn reg_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Solves I_x(a, b) = p for x by bisection. I_x is monotone in x, so this
/// converges unconditionally.
fn inverse_reg_beta(a: f64, b: f64, p: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = 1.0;
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if reg_beta(a, b, mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }
    0.5 * (lo + hi)
}

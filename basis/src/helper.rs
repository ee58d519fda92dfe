use libm::erf;
use std::f64::consts::PI;

/// Above this argument the Boys function is obtained from the closed form of
/// F_0 and upward recursion; below it the series converges quickly.
const BOYS_SERIES_LIMIT: f64 = 30.0;
const BOYS_MAX_TERMS: usize = 400;

/// Boys function F_n(x) = int_0^1 t^(2n) exp(-x t^2) dt.
///
/// For x < 30 the positive-term series
/// F_n(x) = exp(-x) sum_k (2x)^k / ((2n+1)(2n+3)...(2n+2k+1))
/// is summed to machine precision. For larger x,
/// F_0(x) = sqrt(pi/x) erf(sqrt(x)) / 2 and
/// F_(k+1)(x) = ((2k+1) F_k(x) - exp(-x)) / (2x).
pub fn boys_function(n: i32, x: f64) -> f64 {
    debug_assert!(n >= 0, "n must be nonnegative");
    debug_assert!(x >= 0.0, "x must be nonnegative");

    if x < 1e-15 {
        return 1.0 / (2 * n + 1) as f64;
    }

    if x < BOYS_SERIES_LIMIT {
        boys_series(n, x)
    } else {
        boys_closed_form(n, x)
    }
}

fn boys_series(n: i32, x: f64) -> f64 {
    let mut term = 1.0 / (2 * n + 1) as f64;
    let mut sum = term;
    for k in 1..BOYS_MAX_TERMS {
        term *= 2.0 * x / (2 * n + 2 * k as i32 + 1) as f64;
        sum += term;
        if term < sum * 1e-17 {
            break;
        }
    }
    (-x).exp() * sum
}

fn boys_closed_form(n: i32, x: f64) -> f64 {
    let ex = (-x).exp();
    let mut f = 0.5 * (PI / x).sqrt() * erf(x.sqrt());
    for k in 0..n {
        f = ((2 * k + 1) as f64 * f - ex) / (2.0 * x);
    }
    f
}

// Simpson's rule integration
#[cfg(test)]
pub(crate) fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

//! Small numeric kernels used when building and applying correction tables.

/// Least-squares straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `(xs[i], ys[i])`.
    ///
    /// Returns `None` when fewer than two points are given, the slices differ in
    /// length, or every `x` is identical (the slope is undefined).
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() < 2 || xs.len() != ys.len() {
            return None;
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            let dx = x - x_mean;
            sxx += dx * dx;
            sxy += dx * (y - y_mean);
        }

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Solve `y = slope * x + intercept` for `x`.
    pub fn invert(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

/// Median of `values`, averaging the two middle elements for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Piecewise-linear interpolation of `fp` over ascending abscissae `xp`.
///
/// Values outside `[xp[0], xp[last]]` clamp to the end values. Repeated
/// abscissae are allowed; the right-most sample of a run wins.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert!(!xp.is_empty() && xp.len() == fp.len());

    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }

    // xp[j - 1] <= x < xp[j], so the segment has non-zero width.
    let j = xp.partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// `n` evenly spaced values from `start` to `end` inclusive, written into `out`.
pub fn linspace_into(start: f64, end: f64, out: &mut [f64]) {
    let n = out.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        out[0] = start;
        return;
    }

    let step = (end - start) / (n - 1) as f64;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = start + step * i as f64;
    }
    // Pin the end point exactly.
    out[n - 1] = end;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_exact_line() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 100.0 * x + 50.0).collect();

        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert!((fit.slope - 100.0).abs() < 1e-9);
        assert!((fit.intercept - 50.0).abs() < 1e-9);
        assert!((fit.invert(350.0) - 3.0).abs() < 1e-9);
        assert!((fit.eval(-0.5) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        assert!(LinearFit::fit(&[1.0], &[2.0]).is_none());
        assert!(LinearFit::fit(&[2.0, 2.0], &[1.0, 3.0]).is_none());
        assert!(LinearFit::fit(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_interp_clamps_and_interpolates() {
        let xp = [0.0, 10.0, 20.0];
        let fp = [1.0, 2.0, 4.0];

        assert_eq!(interp(-5.0, &xp, &fp), 1.0);
        assert_eq!(interp(25.0, &xp, &fp), 4.0);
        assert!((interp(5.0, &xp, &fp) - 1.5).abs() < 1e-12);
        assert!((interp(15.0, &xp, &fp) - 3.0).abs() < 1e-12);
        assert_eq!(interp(10.0, &xp, &fp), 2.0);
    }

    #[test]
    fn test_interp_with_flat_step() {
        let xp = [0.0, 5.0, 5.0, 10.0];
        let fp = [0.0, 1.0, 2.0, 3.0];

        assert_eq!(interp(5.0, &xp, &fp), 2.0);
        assert!((interp(7.5, &xp, &fp) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_endpoints() {
        let mut out = [0.0; 5];
        linspace_into(150.0, 350.0, &mut out);
        assert_eq!(out, [150.0, 200.0, 250.0, 300.0, 350.0]);
    }
}

//! report::chart — plain-text charts for the Markdown report.
//!
//! Charts are fenced text blocks so the report renders the same in a
//! terminal, a diff and a Markdown viewer.
//!
//! - [`line_chart`] plots a series (bucket-averaged down to the chart
//!   width) with an optional horizontal reference line, e.g. the ECT mean.
//! - [`sparkline`] squeezes a short path (an impulse response) into one
//!   line of block characters.

/// Default plot area of [`line_chart`].
pub const CHART_WIDTH: usize = 72;
pub const CHART_HEIGHT: usize = 12;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// ASCII line chart of `values` with the y range labelled on the left.
///
/// Returns an empty string for empty input or a zero-sized plot area.
pub fn line_chart(values: &[f64], width: usize, height: usize, reference: Option<f64>) -> String {
    if values.is_empty() || width == 0 || height == 0 {
        return String::new();
    }
    let points = bucket_means(values, width);
    let (mut lo, mut hi) = points.iter().chain(reference.iter()).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), &v| (lo.min(v), hi.max(v)),
    );
    if hi - lo < f64::EPSILON * hi.abs().max(1.0) {
        lo -= 1.0;
        hi += 1.0;
    }
    let row_of = |v: f64| (((hi - v) / (hi - lo)) * (height - 1) as f64).round() as usize;

    let mut grid = vec![vec![' '; points.len()]; height];
    if let Some(r) = reference {
        grid[row_of(r)].iter_mut().for_each(|cell| *cell = '-');
    }
    for (col, &v) in points.iter().enumerate() {
        grid[row_of(v)][col] = '*';
    }

    let mut out = String::new();
    for (row, cells) in grid.iter().enumerate() {
        let label = if row == 0 {
            format!("{hi:>11.2}")
        } else if row == height - 1 {
            format!("{lo:>11.2}")
        } else {
            " ".repeat(11)
        };
        out.push_str(&label);
        out.push_str(" |");
        out.extend(cells.iter());
        out.push('\n');
    }
    out.push_str(&" ".repeat(12));
    out.push('+');
    out.push_str(&"-".repeat(points.len()));
    out.push('\n');
    out
}

/// One block character per value, scaled between the path's min and max.
pub fn sparkline(values: &[f64]) -> String {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    scaled_sparkline(values, lo, hi)
}

/// As [`sparkline`] on a fixed `[lo, hi]` scale; values outside are
/// clamped. Used for shares, where 0 and 1 must look the same in every row.
pub fn scaled_sparkline(values: &[f64], lo: f64, hi: f64) -> String {
    let span = hi - lo;
    let top = SPARK_LEVELS.len() - 1;
    values
        .iter()
        .map(|&v| {
            if span <= 0.0 || !span.is_finite() {
                return SPARK_LEVELS[3];
            }
            let pos = ((v - lo) / span).clamp(0.0, 1.0);
            SPARK_LEVELS[((pos * top as f64).round() as usize).min(top)]
        })
        .collect()
}

/// Average consecutive values into at most `width` buckets.
fn bucket_means(values: &[f64], width: usize) -> Vec<f64> {
    let n = values.len();
    if n <= width {
        return values.to_vec();
    }
    (0..width)
        .map(|b| {
            let start = b * n / width;
            let end = ((b + 1) * n / width).max(start + 1);
            values[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

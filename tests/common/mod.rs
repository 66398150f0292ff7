#![allow(dead_code)]

use covmetrics::{LineHits, Metrics};

/// Build metrics from a raw coverage array, `None` marking non-executable lines.
pub fn metrics(cells: &[Option<i64>]) -> Metrics {
    Metrics::from_raw(cells)
}

/// Turn a raw coverage array into per-line values.
pub fn lines(cells: &[Option<i64>]) -> Vec<LineHits> {
    cells.iter().map(|&c| LineHits::from_raw(c)).collect()
}

pub fn assert_coverage(m: &Metrics, expected: f64) {
    let actual = m.line_coverage();
    assert!(
        (actual - expected).abs() < 1e-4,
        "line coverage {} != {}",
        actual,
        expected
    );
}

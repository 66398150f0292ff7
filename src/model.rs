//! In-memory representation of per-line coverage for a single source file.
//! Collaborators hand us raw hit-count arrays; everything here is reduced to
//! a [`Metrics`] value before it leaves the crate.

use crate::error::{CovError, Result};
use crate::metrics::Metrics;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// Coverage state of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(into = "Option<u64>")
)]
pub enum LineHits {
    /// Comments, blank lines, declarations: nothing to execute.
    #[default]
    NotExecutable,
    /// An instrumentable line and the number of times it ran.
    Executable(u64),
}

impl LineHits {
    /// Convert a raw coverage cell (`null`, `0`, `n`).
    ///
    /// Negative counts are not rejected: such a line still counts as a
    /// statement but never as covered. Use `LineHits::try_from(i64)` to
    /// refuse them instead.
    #[must_use]
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None => LineHits::NotExecutable,
            Some(n) => LineHits::Executable(u64::try_from(n).unwrap_or(0)),
        }
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        matches!(self, LineHits::Executable(_))
    }

    #[must_use]
    pub fn is_covered(&self) -> bool {
        matches!(self, LineHits::Executable(n) if *n > 0)
    }

    #[must_use]
    pub fn hit_count(&self) -> Option<u64> {
        match self {
            LineHits::NotExecutable => None,
            LineHits::Executable(n) => Some(*n),
        }
    }
}

impl From<Option<i64>> for LineHits {
    fn from(raw: Option<i64>) -> Self {
        LineHits::from_raw(raw)
    }
}

impl From<u64> for LineHits {
    fn from(hits: u64) -> Self {
        LineHits::Executable(hits)
    }
}

impl TryFrom<i64> for LineHits {
    type Error = CovError;

    fn try_from(hits: i64) -> Result<Self> {
        u64::try_from(hits)
            .map(LineHits::Executable)
            .map_err(|_| CovError::NegativeHitCount(hits))
    }
}

impl From<LineHits> for Option<u64> {
    fn from(line: LineHits) -> Self {
        line.hit_count()
    }
}

/// Accepts `null`, any unsigned count, or a negative count (read through
/// [`LineHits::from_raw`]).
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for LineHits {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum RawHitCount {
            Unsigned(u64),
            Signed(i64),
        }

        let raw: Option<RawHitCount> = serde::Deserialize::deserialize(deserializer)?;
        Ok(match raw {
            None => LineHits::NotExecutable,
            Some(RawHitCount::Unsigned(n)) => LineHits::Executable(n),
            Some(RawHitCount::Signed(n)) => LineHits::from_raw(Some(n)),
        })
    }
}

/// Highest line number [`SourceCoverage::add_hits`] accepts.
pub const MAX_LINE_NUMBER: u32 = 1 << 24;

/// Coverage array for a single source file. Index 0 holds line 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCoverage {
    name: String,
    lines: Vec<LineHits>,
}

impl SourceCoverage {
    /// A file of `line_count` lines, none of them executable yet.
    pub fn new(name: impl Into<String>, line_count: usize) -> Self {
        Self {
            name: name.into(),
            lines: vec![LineHits::NotExecutable; line_count],
        }
    }

    pub fn from_lines(name: impl Into<String>, lines: Vec<LineHits>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[LineHits] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Record `hits` executions of a 1-based line. Repeated records for the
    /// same line accumulate; lines past the end grow the array, up to
    /// [`MAX_LINE_NUMBER`].
    pub fn add_hits(&mut self, line_number: u32, hits: u64) -> Result<()> {
        if line_number == 0 {
            return Err(CovError::InvalidLineNumber(line_number));
        }
        if line_number > MAX_LINE_NUMBER {
            return Err(CovError::LineOutOfRange {
                line: line_number,
                max: MAX_LINE_NUMBER,
            });
        }
        let idx = (line_number - 1) as usize;
        if idx >= self.lines.len() {
            self.lines.resize(idx + 1, LineHits::NotExecutable);
        }
        let slot = &mut self.lines[idx];
        *slot = match *slot {
            LineHits::NotExecutable => LineHits::Executable(hits),
            LineHits::Executable(n) => LineHits::Executable(n.saturating_add(hits)),
        };
        Ok(())
    }

    /// 1-based numbers of executable lines that never ran.
    pub fn uncovered_lines(&self) -> Vec<u32> {
        self.lines
            .iter()
            .zip(1u32..)
            .filter(|(line, _)| line.is_executable() && !line.is_covered())
            .map(|(_, number)| number)
            .collect()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::from_lines(self.lines.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 4), 0.25);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(LineHits::from_raw(None), LineHits::NotExecutable);
        assert_eq!(LineHits::from_raw(Some(0)), LineHits::Executable(0));
        assert_eq!(LineHits::from_raw(Some(7)), LineHits::Executable(7));
        // Negative counts stay executable but are never covered.
        let negative = LineHits::from_raw(Some(-1));
        assert!(negative.is_executable());
        assert!(!negative.is_covered());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(LineHits::from(None), LineHits::NotExecutable);
        assert_eq!(LineHits::from(Some(-4)), LineHits::Executable(0));
        assert_eq!(LineHits::from(u64::MAX), LineHits::Executable(u64::MAX));
        assert_eq!(Option::<u64>::from(LineHits::Executable(2)), Some(2));
    }

    #[test]
    fn test_try_from_rejects_negative() {
        assert_eq!(LineHits::try_from(3i64), Ok(LineHits::Executable(3)));
        assert_eq!(
            LineHits::try_from(-2i64),
            Err(CovError::NegativeHitCount(-2))
        );
    }

    #[test]
    fn test_predicates() {
        assert!(!LineHits::NotExecutable.is_executable());
        assert!(!LineHits::NotExecutable.is_covered());
        assert!(LineHits::Executable(0).is_executable());
        assert!(!LineHits::Executable(0).is_covered());
        assert!(LineHits::Executable(2).is_covered());
        assert_eq!(LineHits::NotExecutable.hit_count(), None);
        assert_eq!(LineHits::Executable(2).hit_count(), Some(2));
    }

    #[test]
    fn test_add_hits_grows_and_accumulates() {
        let mut file = SourceCoverage::new("src/lib.rs", 2);
        file.add_hits(1, 0).unwrap();
        file.add_hits(4, 2).unwrap();
        file.add_hits(4, 3).unwrap();

        assert_eq!(file.line_count(), 4);
        assert_eq!(
            file.lines(),
            &[
                LineHits::Executable(0),
                LineHits::NotExecutable,
                LineHits::NotExecutable,
                LineHits::Executable(5),
            ]
        );
        assert_eq!(file.uncovered_lines(), vec![1]);
    }

    #[test]
    fn test_add_hits_line_zero() {
        let mut file = SourceCoverage::new("src/lib.rs", 1);
        assert_eq!(file.add_hits(0, 1), Err(CovError::InvalidLineNumber(0)));
        assert_eq!(file.lines(), &[LineHits::NotExecutable]);
    }

    #[test]
    fn test_add_hits_rejects_huge_line_number() {
        let mut file = SourceCoverage::new("src/lib.rs", 1);
        assert_eq!(
            file.add_hits(u32::MAX, 1),
            Err(CovError::LineOutOfRange {
                line: u32::MAX,
                max: MAX_LINE_NUMBER,
            })
        );
        assert_eq!(file.line_count(), 1);

        assert!(matches!(
            file.add_hits(MAX_LINE_NUMBER + 1, 1),
            Err(CovError::LineOutOfRange { .. })
        ));
        assert_eq!(file.lines(), &[LineHits::NotExecutable]);
    }

    #[test]
    fn test_add_hits_saturates() {
        let mut file = SourceCoverage::new("a.rs", 0);
        file.add_hits(1, u64::MAX).unwrap();
        file.add_hits(1, 10).unwrap();
        assert_eq!(file.lines()[0], LineHits::Executable(u64::MAX));
    }

    #[test]
    fn test_source_metrics() {
        let file = SourceCoverage::from_lines(
            "src/main.rs",
            vec![
                LineHits::NotExecutable,
                LineHits::Executable(0),
                LineHits::Executable(4),
            ],
        );
        let metrics = file.metrics();
        assert_eq!(file.name(), "src/main.rs");
        assert_eq!(metrics.statements(), 2);
        assert_eq!(metrics.covered_statements(), 1);
        assert_eq!(metrics.line_coverage(), 50.0);
    }
}

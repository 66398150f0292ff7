//! Line coverage statistics for one scope: a single source file, or any
//! aggregate of files rolled up through [`Metrics::merge`].

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;
use std::sync::OnceLock;

use crate::model::{rate, LineHits};

/// Statement counters plus a lazily computed line-coverage percentage.
///
/// The percentage is derived from the counters on first read and cached
/// until the next [`merge`](Metrics::merge). Equality looks at the counters
/// only.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    statements: u64,
    covered_statements: u64,
    line_coverage: OnceLock<f64>,
}

impl Metrics {
    /// Metrics of a scope with no statements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce a per-line coverage array to its counters. Line order does not
    /// matter.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = LineHits>,
    {
        let (statements, covered_statements) =
            lines
                .into_iter()
                .fold((0u64, 0u64), |(total, covered), line| match line {
                    LineHits::NotExecutable => (total, covered),
                    LineHits::Executable(0) => (total + 1, covered),
                    LineHits::Executable(_) => (total + 1, covered + 1),
                });
        tracing::trace!(statements, covered_statements, "reduced coverage lines");
        Self {
            statements,
            covered_statements,
            line_coverage: OnceLock::new(),
        }
    }

    /// Reduce a raw coverage array where `None` marks a non-executable line.
    #[must_use]
    pub fn from_raw(raw: &[Option<i64>]) -> Self {
        Self::from_lines(raw.iter().map(|&cell| LineHits::from_raw(cell)))
    }

    /// Build from counters that were already reduced elsewhere.
    /// `covered_statements` is clamped to `statements`.
    #[must_use]
    pub fn with_counts(statements: u64, covered_statements: u64) -> Self {
        Self {
            statements,
            covered_statements: covered_statements.min(statements),
            line_coverage: OnceLock::new(),
        }
    }

    /// Add `other`'s counters into `self` and drop the cached percentage.
    pub fn merge(&mut self, other: &Metrics) {
        let before = (self.statements, self.covered_statements);
        self.statements = self.statements.saturating_add(other.statements);
        self.covered_statements = self
            .covered_statements
            .saturating_add(other.covered_statements)
            .min(self.statements);
        self.line_coverage.take();
        tracing::trace!(
            ?before,
            statements = self.statements,
            covered_statements = self.covered_statements,
            "merged metrics"
        );
    }

    #[must_use]
    pub fn has_statements(&self) -> bool {
        self.statements != 0
    }

    #[must_use]
    pub fn statements(&self) -> u64 {
        self.statements
    }

    #[must_use]
    pub fn covered_statements(&self) -> u64 {
        self.covered_statements
    }

    #[must_use]
    pub fn uncovered_statements(&self) -> u64 {
        self.statements - self.covered_statements
    }

    /// Covered over total statements, in [0, 1].
    #[must_use]
    pub fn line_rate(&self) -> f64 {
        rate(self.covered_statements, self.statements)
    }

    /// Covered over total statements as a percentage in [0, 100]. A scope
    /// without statements reports 0.
    #[must_use]
    pub fn line_coverage(&self) -> f64 {
        *self.line_coverage.get_or_init(|| self.line_rate() * 100.0)
    }

    #[cfg(test)]
    fn is_cached(&self) -> bool {
        self.line_coverage.get().is_some()
    }
}

impl PartialEq for Metrics {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements && self.covered_statements == other.covered_statements
    }
}

impl Eq for Metrics {}

impl FromIterator<LineHits> for Metrics {
    fn from_iter<I: IntoIterator<Item = LineHits>>(iter: I) -> Self {
        Self::from_lines(iter)
    }
}

impl AddAssign<&Metrics> for Metrics {
    fn add_assign(&mut self, other: &Metrics) {
        self.merge(other);
    }
}

impl AddAssign for Metrics {
    fn add_assign(&mut self, other: Metrics) {
        self.merge(&other);
    }
}

impl Sum for Metrics {
    fn sum<I: Iterator<Item = Metrics>>(iter: I) -> Self {
        iter.fold(Metrics::new(), |mut total, m| {
            total.merge(&m);
            total
        })
    }
}

impl<'a> Sum<&'a Metrics> for Metrics {
    fn sum<I: Iterator<Item = &'a Metrics>>(iter: I) -> Self {
        iter.fold(Metrics::new(), |mut total, m| {
            total.merge(m);
            total
        })
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%)",
            self.covered_statements,
            self.statements,
            self.line_coverage()
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Metrics {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Metrics", 3)?;
        state.serialize_field("statements", &self.statements)?;
        state.serialize_field("covered_statements", &self.covered_statements)?;
        state.serialize_field("line_coverage", &self.line_coverage())?;
        state.end()
    }
}

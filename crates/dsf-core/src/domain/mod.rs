pub mod errors;

pub use errors::{DsfError, DsfErrorCategory, DsfResult, ExitPlaceholder};

use std::fmt::{Display, Formatter};

/// Running-regression flavour used when smoothing the reference set along
/// the parameter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegressionType {
    Linear,
    Quadratic,
}

impl RegressionType {
    pub const ALL: [RegressionType; 2] = [Self::Linear, Self::Quadratic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
        }
    }

    /// Smallest regression window that leaves at least one degree of freedom.
    pub const fn min_window(self) -> usize {
        match self {
            Self::Linear => 3,
            Self::Quadratic => 4,
        }
    }

    pub const fn polynomial_degree(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Quadratic => 2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
    }

    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for RegressionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

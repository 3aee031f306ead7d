use crate::domain::{DsfError, DsfResult};
use serde::{Deserialize, Serialize};

/// One row of a matrix workspace.
///
/// `x` holds bin edges for histogram data (`x.len() == y.len() + 1`) or
/// point positions for point data (`x.len() == y.len()`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpectrumDocument", into = "SpectrumDocument")]
pub struct Spectrum {
    x: Vec<f64>,
    y: Vec<f64>,
    e: Vec<f64>,
}

impl Spectrum {
    pub fn new(x: Vec<f64>, y: Vec<f64>, e: Vec<f64>) -> DsfResult<Self> {
        if x.len() != y.len() && x.len() != y.len() + 1 {
            return Err(DsfError::input_validation(
                "INPUT.SPECTRUM_SHAPE",
                format!(
                    "spectrum x length {} must equal y length {} (points) or y length + 1 (histogram)",
                    x.len(),
                    y.len()
                ),
            ));
        }
        if e.len() != y.len() {
            return Err(DsfError::input_validation(
                "INPUT.SPECTRUM_SHAPE",
                format!(
                    "spectrum e length {} must equal y length {}",
                    e.len(),
                    y.len()
                ),
            ));
        }
        if let Some(index) = x.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(DsfError::input_validation(
                "INPUT.SPECTRUM_X_ORDER",
                format!(
                    "spectrum x values must be non-decreasing, index {} has {} after {}",
                    index + 1,
                    x[index + 1],
                    x[index]
                ),
            ));
        }
        Ok(Self { x, y, e })
    }

    /// Spectrum with zero uncertainties.
    pub fn without_errors(x: Vec<f64>, y: Vec<f64>) -> DsfResult<Self> {
        let e = vec![0.0; y.len()];
        Self::new(x, y, e)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn e(&self) -> &[f64] {
        &self.e
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn is_histogram(&self) -> bool {
        self.x.len() == self.y.len() + 1
    }

    /// Bin edges, derived from point positions when the spectrum holds point
    /// data: midpoints between neighbours, outer edges pushed out by half the
    /// adjacent spacing.
    pub fn bin_edges(&self) -> Vec<f64> {
        if self.is_histogram() {
            return self.x.clone();
        }
        points_to_edges(&self.x)
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.x, self.y, self.e)
    }
}

pub(crate) fn points_to_edges(points: &[f64]) -> Vec<f64> {
    match points.len() {
        0 => Vec::new(),
        1 => vec![points[0] - 0.5, points[0] + 0.5],
        count => {
            let mut edges = Vec::with_capacity(count + 1);
            edges.push(points[0] - 0.5 * (points[1] - points[0]));
            edges.extend(points.windows(2).map(|pair| 0.5 * (pair[0] + pair[1])));
            edges.push(points[count - 1] + 0.5 * (points[count - 1] - points[count - 2]));
            edges
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpectrumDocument {
    x: Vec<f64>,
    y: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<Vec<f64>>,
}

impl TryFrom<SpectrumDocument> for Spectrum {
    type Error = DsfError;

    fn try_from(document: SpectrumDocument) -> Result<Self, Self::Error> {
        match document.e {
            Some(e) => Spectrum::new(document.x, document.y, e),
            None => Spectrum::without_errors(document.x, document.y),
        }
    }
}

impl From<Spectrum> for SpectrumDocument {
    fn from(spectrum: Spectrum) -> Self {
        let (x, y, e) = spectrum.into_parts();
        Self { x, y, e: Some(e) }
    }
}

/// Row-indexed collection of spectra, the unit stored by name in a
/// [`super::WorkspaceStore`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixWorkspace {
    pub spectra: Vec<Spectrum>,
    /// Y values are densities (per unit x) rather than counts per bin.
    #[serde(default)]
    pub distribution: bool,
}

impl MatrixWorkspace {
    pub fn new(spectra: Vec<Spectrum>, distribution: bool) -> Self {
        Self {
            spectra,
            distribution,
        }
    }

    pub fn single(spectrum: Spectrum, distribution: bool) -> Self {
        Self::new(vec![spectrum], distribution)
    }

    pub fn histogram_count(&self) -> usize {
        self.spectra.len()
    }

    pub fn spectrum(&self, index: usize) -> Option<&Spectrum> {
        self.spectra.get(index)
    }
}

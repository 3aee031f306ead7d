use crate::domain::{DsfError, DsfResult};
use crate::numerics::stable_sum_iter;
use crate::workspace::{MatrixWorkspace, Spectrum};
use serde::{Deserialize, Serialize};

/// Edges closer than this fraction of the bin width to `end` are treated as
/// landing on it.
const EDGE_TOLERANCE: f64 = 1.0e-9;
/// A trailing bin narrower than this fraction of the step is merged into its
/// neighbour.
const MIN_LAST_BIN_FRACTION: f64 = 0.25;

/// `[start, width, end]` binning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebinParams {
    pub start: f64,
    pub width: f64,
    pub end: f64,
}

impl RebinParams {
    pub fn new(start: f64, width: f64, end: f64) -> Self {
        Self { start, width, end }
    }

    /// Bin grid that brackets equally spaced sample points: half a step
    /// below the first point to half a step above the last.
    pub fn centered_on(samples: &[f64]) -> DsfResult<Self> {
        if samples.len() < 2 {
            return Err(DsfError::input_validation(
                "INPUT.SAMPLE_GRID",
                format!(
                    "at least 2 sample points are required to derive a bin grid, got {}",
                    samples.len()
                ),
            ));
        }
        let first = samples[0];
        let last = samples[samples.len() - 1];
        let width = (last - first) / (samples.len() - 1) as f64;
        Ok(Self::new(first - width / 2.0, width, last + width / 2.0))
    }

    pub fn validate(&self) -> DsfResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() || !self.width.is_finite() {
            return Err(DsfError::input_validation(
                "INPUT.REBIN_PARAMS",
                format!(
                    "rebin parameters must be finite, got [{}, {}, {}]",
                    self.start, self.width, self.end
                ),
            ));
        }
        if self.width <= 0.0 {
            return Err(DsfError::input_validation(
                "INPUT.REBIN_PARAMS",
                format!("rebin width must be positive, got {}", self.width),
            ));
        }
        if self.end <= self.start {
            return Err(DsfError::input_validation(
                "INPUT.REBIN_PARAMS",
                format!(
                    "rebin end {} must be greater than start {}",
                    self.end, self.start
                ),
            ));
        }
        Ok(())
    }

    pub fn bin_edges(&self) -> DsfResult<Vec<f64>> {
        self.validate()?;

        let mut edges = vec![self.start];
        let cutoff = self.end - self.width * EDGE_TOLERANCE;
        let mut step = 1.0;
        loop {
            let next = self.start + step * self.width;
            if next >= cutoff {
                break;
            }
            edges.push(next);
            step += 1.0;
        }
        edges.push(self.end);

        let count = edges.len();
        if count > 2 && edges[count - 1] - edges[count - 2] < MIN_LAST_BIN_FRACTION * self.width
        {
            edges.remove(count - 2);
        }
        Ok(edges)
    }
}

/// Rebin every histogram of `workspace` onto the grid described by `params`.
pub fn rebin_workspace(
    workspace: &MatrixWorkspace,
    params: RebinParams,
) -> DsfResult<MatrixWorkspace> {
    let edges = params.bin_edges()?;
    rebin_workspace_to_edges(workspace, &edges)
}

pub fn rebin_workspace_to_edges(
    workspace: &MatrixWorkspace,
    edges: &[f64],
) -> DsfResult<MatrixWorkspace> {
    let spectra = workspace
        .spectra
        .iter()
        .map(|spectrum| rebin_spectrum(spectrum, edges, workspace.distribution))
        .collect::<DsfResult<Vec<_>>>()?;
    Ok(MatrixWorkspace::new(spectra, workspace.distribution))
}

/// Redistribute one spectrum onto `new_edges` by fractional bin overlap.
///
/// Counts are split in proportion to the overlapped fraction of each input
/// bin; distributions are overlap-weighted averages. Uncertainties add in
/// quadrature with the same weights. Parts of a new bin outside the input
/// range contribute nothing.
pub fn rebin_spectrum(
    spectrum: &Spectrum,
    new_edges: &[f64],
    distribution: bool,
) -> DsfResult<Spectrum> {
    if new_edges.len() < 2 {
        return Err(DsfError::input_validation(
            "INPUT.REBIN_EDGES",
            format!("rebin requires at least 2 edges, got {}", new_edges.len()),
        ));
    }
    if let Some(index) = new_edges.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(DsfError::input_validation(
            "INPUT.REBIN_EDGES",
            format!("rebin edges must be strictly increasing at index {}", index + 1),
        ));
    }

    let old_edges = spectrum.bin_edges();
    let old_y = spectrum.y();
    let old_e = spectrum.e();
    let old_count = old_y.len();
    let new_count = new_edges.len() - 1;

    let mut y = Vec::with_capacity(new_count);
    let mut e = Vec::with_capacity(new_count);
    let mut first_old = 0;

    for bin in 0..new_count {
        let lo = new_edges[bin];
        let hi = new_edges[bin + 1];
        while first_old < old_count && old_edges[first_old + 1] <= lo {
            first_old += 1;
        }

        let mut contributions = Vec::new();
        let mut index = first_old;
        while index < old_count && old_edges[index] < hi {
            let old_lo = old_edges[index];
            let old_hi = old_edges[index + 1];
            let overlap = hi.min(old_hi) - lo.max(old_lo);
            let old_width = old_hi - old_lo;
            if overlap > 0.0 && old_width > 0.0 {
                let weight = if distribution {
                    overlap
                } else {
                    overlap / old_width
                };
                contributions.push((old_y[index] * weight, old_e[index] * weight));
            }
            index += 1;
        }

        let value = stable_sum_iter(contributions.iter().map(|(value, _)| *value));
        let variance = stable_sum_iter(contributions.iter().map(|(_, error)| error * error));
        if distribution {
            let width = hi - lo;
            y.push(value / width);
            e.push(variance.sqrt() / width);
        } else {
            y.push(value);
            e.push(variance.sqrt());
        }
    }

    Spectrum::new(new_edges.to_vec(), y, e)
}

#[cfg(test)]
mod tests {
    use super::{RebinParams, rebin_spectrum};
    use crate::workspace::Spectrum;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, b) in actual.iter().zip(expected) {
            assert!((a - b).abs() < 1.0e-12, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn params_expand_to_uniform_edges() {
        let edges = RebinParams::new(0.0, 0.5, 2.0).bin_edges().expect("valid params");
        assert_close(&edges, &[0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn partial_last_bin_is_kept_or_merged() {
        let kept = RebinParams::new(0.0, 1.0, 2.5).bin_edges().expect("valid params");
        assert_close(&kept, &[0.0, 1.0, 2.0, 2.5]);

        let merged = RebinParams::new(0.0, 1.0, 2.1).bin_edges().expect("valid params");
        assert_close(&merged, &[0.0, 1.0, 2.1]);
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(RebinParams::new(0.0, 0.0, 1.0).bin_edges().is_err());
        assert!(RebinParams::new(1.0, 0.1, 0.0).bin_edges().is_err());
        assert!(RebinParams::new(f64::NAN, 0.1, 1.0).bin_edges().is_err());
    }

    #[test]
    fn centered_grid_brackets_samples() {
        let params = RebinParams::centered_on(&[1.0, 2.0, 3.0, 4.0]).expect("grid");
        assert_eq!(params, RebinParams::new(0.5, 1.0, 4.5));
        let edges = params.bin_edges().expect("edges");
        assert_close(&edges, &[0.5, 1.5, 2.5, 3.5, 4.5]);
        assert!(RebinParams::centered_on(&[1.0]).is_err());
    }

    #[test]
    fn counts_split_by_overlap_fraction() {
        let spectrum = Spectrum::new(
            vec![0.0, 1.0, 2.0],
            vec![4.0, 8.0],
            vec![2.0, 2.0],
        )
        .expect("valid spectrum");
        let rebinned = rebin_spectrum(&spectrum, &[0.5, 1.5], false).expect("rebin");
        assert_close(rebinned.y(), &[6.0]);
        assert_close(rebinned.e(), &[2.0_f64.sqrt()]);
    }

    #[test]
    fn distribution_is_overlap_averaged() {
        let spectrum = Spectrum::without_errors(vec![0.0, 1.0, 2.0, 3.0], vec![2.0, 2.0, 2.0])
            .expect("valid spectrum");
        let rebinned =
            rebin_spectrum(&spectrum, &[0.25, 0.75, 1.5, 2.5], true).expect("rebin");
        assert_close(rebinned.y(), &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn uncovered_range_contributes_zero() {
        let spectrum =
            Spectrum::without_errors(vec![0.0, 1.0], vec![3.0]).expect("valid spectrum");
        let rebinned = rebin_spectrum(&spectrum, &[1.0, 2.0, 3.0], false).expect("rebin");
        assert_close(rebinned.y(), &[0.0, 0.0]);
    }

    #[test]
    fn point_data_is_binned_around_points() {
        let spectrum = Spectrum::without_errors(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0])
            .expect("valid spectrum");
        let rebinned = rebin_spectrum(&spectrum, &[-0.5, 0.5, 1.5, 2.5], true).expect("rebin");
        assert!(rebinned.is_histogram());
        assert_close(rebinned.y(), &[1.0, 2.0, 3.0]);
    }
}

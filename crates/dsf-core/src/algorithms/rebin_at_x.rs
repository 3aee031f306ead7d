use super::rebin::{RebinParams, rebin_spectrum};
use crate::domain::{DsfError, DsfResult};
use crate::workspace::MatrixWorkspace;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinWidthRounding {
    #[default]
    #[serde(rename = "None")]
    None,
    #[serde(rename = "10^n")]
    TenPower,
}

impl BinWidthRounding {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            candidate if candidate.eq_ignore_ascii_case("none") => Some(Self::None),
            "10^n" => Some(Self::TenPower),
            _ => None,
        }
    }

    pub fn apply(self, width: f64) -> f64 {
        match self {
            Self::None => width,
            Self::TenPower => 10.0_f64.powf(width.log10().round()),
        }
    }
}

impl Display for BinWidthRounding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::TenPower => f.write_str("10^n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinWidthAtX {
    pub workspace: MatrixWorkspace,
    pub bin_width: f64,
}

/// Rebin every histogram to the width of the bin containing `x`, averaged
/// over all histograms. Each histogram keeps its own first and last edge.
pub fn rebin_to_bin_width_at_x(
    workspace: &MatrixWorkspace,
    x: f64,
    rounding: BinWidthRounding,
) -> DsfResult<BinWidthAtX> {
    if workspace.histogram_count() == 0 {
        return Err(DsfError::input_validation(
            "INPUT.REBIN_AT_X",
            "workspace has no histograms",
        ));
    }

    let mut width_sum = 0.0;
    for (index, spectrum) in workspace.spectra.iter().enumerate() {
        let edges = spectrum.bin_edges();
        width_sum += width_of_bin_containing(&edges, x).ok_or_else(|| {
            DsfError::input_validation(
                "INPUT.REBIN_AT_X",
                format!("X {x} is out of bounds for histogram {index}"),
            )
        })?;
    }
    let bin_width = rounding.apply(width_sum / workspace.histogram_count() as f64);

    let spectra = workspace
        .spectra
        .iter()
        .map(|spectrum| {
            let edges = spectrum.bin_edges();
            let params = RebinParams::new(edges[0], bin_width, edges[edges.len() - 1]);
            rebin_spectrum(spectrum, &params.bin_edges()?, workspace.distribution)
        })
        .collect::<DsfResult<Vec<_>>>()?;

    Ok(BinWidthAtX {
        workspace: MatrixWorkspace::new(spectra, workspace.distribution),
        bin_width,
    })
}

fn width_of_bin_containing(edges: &[f64], x: f64) -> Option<f64> {
    let last = *edges.last()?;
    if edges.len() < 2 || x < edges[0] || x > last {
        return None;
    }
    let upper = edges.partition_point(|edge| *edge <= x).clamp(1, edges.len() - 1);
    Some(edges[upper] - edges[upper - 1])
}

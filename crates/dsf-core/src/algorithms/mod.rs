pub mod rebin;
pub mod rebin_at_x;

pub use rebin::{RebinParams, rebin_spectrum, rebin_workspace, rebin_workspace_to_edges};
pub use rebin_at_x::{BinWidthAtX, BinWidthRounding, rebin_to_bin_width_at_x};

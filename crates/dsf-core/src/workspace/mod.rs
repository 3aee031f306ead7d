mod model;
mod store;

pub use model::{MatrixWorkspace, Spectrum};
pub(crate) use model::points_to_edges;
pub use store::{AnalysisHost, WorkspaceStore};

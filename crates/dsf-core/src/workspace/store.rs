use super::model::{MatrixWorkspace, Spectrum};
use crate::algorithms::rebin::{RebinParams, rebin_workspace};
use crate::domain::{DsfError, DsfResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Host services a fit function may call while it initializes.
pub trait AnalysisHost {
    fn histogram_count(&self, name: &str) -> DsfResult<usize>;

    /// Rebin `input` onto `params` and store the result as `output`,
    /// replacing any workspace already registered under that name.
    fn rebin(&mut self, input: &str, params: RebinParams, output: &str) -> DsfResult<()>;

    fn spectrum(&self, name: &str, index: usize) -> DsfResult<Spectrum>;

    fn discard(&mut self, name: &str);
}

/// Named workspace registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceStore {
    workspaces: BTreeMap<String, MatrixWorkspace>,
}

#[derive(Debug, Deserialize)]
struct WorkspaceStoreDocument {
    workspaces: BTreeMap<String, MatrixWorkspace>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(source: &str) -> DsfResult<Self> {
        let document: WorkspaceStoreDocument = serde_json::from_str(source).map_err(|error| {
            DsfError::input_validation(
                "INPUT.WORKSPACE_DOCUMENT",
                format!("failed to parse workspace document: {error}"),
            )
        })?;
        Ok(Self {
            workspaces: document.workspaces,
        })
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> DsfResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|error| {
            DsfError::io_system(
                "IO.WORKSPACE_READ",
                format!("failed to read workspace document '{}': {}", path.display(), error),
            )
        })?;
        Self::from_json_str(&source)
    }

    pub fn add(&mut self, name: impl Into<String>, workspace: MatrixWorkspace) -> DsfResult<()> {
        let name = name.into();
        if self.workspaces.contains_key(&name) {
            return Err(DsfError::input_validation(
                "INPUT.WORKSPACE_EXISTS",
                format!("workspace '{name}' already exists"),
            ));
        }
        self.workspaces.insert(name, workspace);
        Ok(())
    }

    pub fn add_or_replace(&mut self, name: impl Into<String>, workspace: MatrixWorkspace) {
        self.workspaces.insert(name.into(), workspace);
    }

    pub fn get(&self, name: &str) -> DsfResult<&MatrixWorkspace> {
        self.workspaces.get(name).ok_or_else(|| {
            DsfError::input_validation(
                "INPUT.WORKSPACE_MISSING",
                format!("workspace '{name}' does not exist"),
            )
        })
    }

    pub fn remove(&mut self, name: &str) -> Option<MatrixWorkspace> {
        self.workspaces.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workspaces.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workspaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

impl AnalysisHost for WorkspaceStore {
    fn histogram_count(&self, name: &str) -> DsfResult<usize> {
        Ok(self.get(name)?.histogram_count())
    }

    fn rebin(&mut self, input: &str, params: RebinParams, output: &str) -> DsfResult<()> {
        let rebinned = rebin_workspace(self.get(input)?, params)?;
        self.add_or_replace(output, rebinned);
        Ok(())
    }

    fn spectrum(&self, name: &str, index: usize) -> DsfResult<Spectrum> {
        let workspace = self.get(name)?;
        workspace.spectrum(index).cloned().ok_or_else(|| {
            DsfError::index_out_of_bounds(
                "INPUT.WORKSPACE_INDEX",
                format!(
                    "workspace '{}' has {} histograms, index {} is out of range",
                    name,
                    workspace.histogram_count(),
                    index
                ),
            )
        })
    }

    fn discard(&mut self, name: &str) {
        self.remove(name);
    }
}

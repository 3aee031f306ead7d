use super::CliError;
use anyhow::Context;
use dsf_core::algorithms::{BinWidthRounding, RebinParams};
use dsf_core::functions::AttributeValue;
use dsf_core::workspace::{MatrixWorkspace, WorkspaceStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub(super) const DEFAULT_FUNCTION: &str = "DSFinterp1DFit";

/// JSON job consumed by `dsfinterp evaluate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct EvaluationJob {
    #[serde(default = "default_function")]
    pub(super) function: String,
    /// Workspace document, resolved relative to the job file.
    #[serde(default)]
    pub(super) workspaces: Option<PathBuf>,
    #[serde(default)]
    pub(super) attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub(super) parameters: BTreeMap<String, f64>,
    pub(super) x: Vec<f64>,
    /// Further parameter sets evaluated in order on the same function
    /// instance, each layered over `parameters`.
    #[serde(default)]
    pub(super) scan: Vec<BTreeMap<String, f64>>,
}

fn default_function() -> String {
    DEFAULT_FUNCTION.to_string()
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct EvaluationReport {
    pub(super) function: String,
    pub(super) x: Vec<f64>,
    pub(super) evaluations: Vec<EvaluationRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct EvaluationRecord {
    pub(super) parameters: BTreeMap<String, f64>,
    pub(super) y: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct WorkspaceReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) bin_width: Option<f64>,
    pub(super) workspaces: BTreeMap<&'a str, &'a MatrixWorkspace>,
}

pub(super) fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(super) fn load_job(path: &Path) -> Result<EvaluationJob, CliError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file '{}'", path.display()))?;
    serde_json::from_str::<EvaluationJob>(&content)
        .with_context(|| format!("failed to parse job file '{}'", path.display()))
        .map_err(CliError::from)
}

/// Workspace document path from the flag, else from the job (relative to
/// the job file's directory).
pub(super) fn resolve_workspace_path(
    flag: Option<PathBuf>,
    job: &EvaluationJob,
    job_path: &Path,
) -> Result<PathBuf, CliError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    let Some(relative) = job.workspaces.as_ref() else {
        return Err(CliError::Usage(
            "no workspace document given; pass --workspaces or set \"workspaces\" in the job"
                .to_string(),
        ));
    };
    if relative.is_absolute() {
        return Ok(relative.clone());
    }
    let base = job_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(base.join(relative))
}

pub(super) fn load_store(path: &Path) -> Result<WorkspaceStore, CliError> {
    WorkspaceStore::load_json_file(path).map_err(CliError::Compute)
}

pub(super) fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write output '{}'", path.display()))?;
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

pub(super) fn parse_rebin_params(raw: &str) -> Result<RebinParams, String> {
    let values = raw
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", token.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [start, width, end] => {
            let params = RebinParams::new(*start, *width, *end);
            params.validate().map_err(|error| error.message().to_string())?;
            Ok(params)
        }
        _ => Err(format!(
            "expected start,width,end but got {} values",
            values.len()
        )),
    }
}

pub(super) fn parse_rounding(raw: &str) -> Result<BinWidthRounding, String> {
    BinWidthRounding::parse(raw).ok_or_else(|| format!("unknown rounding '{raw}'; use None or 10^n"))
}

#[cfg(test)]
mod tests {
    use super::{parse_rebin_params, parse_rounding};
    use dsf_core::algorithms::BinWidthRounding;

    #[test]
    fn rebin_params_parse_from_comma_list() {
        let params = parse_rebin_params("-0.5, 1, 3.5").expect("params");
        assert_eq!((params.start, params.width, params.end), (-0.5, 1.0, 3.5));
        assert!(parse_rebin_params("0,1").is_err());
        assert!(parse_rebin_params("0,-1,3").is_err());
    }

    #[test]
    fn rounding_names_match_algorithm_options() {
        assert_eq!(parse_rounding("None").expect("none"), BinWidthRounding::None);
        assert_eq!(parse_rounding("10^n").expect("power"), BinWidthRounding::TenPower);
        assert!(parse_rounding("nearest").is_err());
    }
}

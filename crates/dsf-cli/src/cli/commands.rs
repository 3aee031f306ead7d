use super::CliError;
use super::helpers::*;
use dsf_core::algorithms::{BinWidthRounding, RebinParams, rebin_to_bin_width_at_x, rebin_workspace};
use dsf_core::functions::{FunctionFactory, register_builtin_functions};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct EvaluateArgs {
    /// JSON job file (function, attributes, parameters, x, scan)
    #[arg(long)]
    job: PathBuf,

    /// Workspace document; overrides the job's "workspaces" entry
    #[arg(long)]
    workspaces: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct RebinArgs {
    /// Workspace document
    #[arg(long)]
    workspaces: PathBuf,

    /// Name of the workspace to rebin
    #[arg(long)]
    input: String,

    /// Bin parameters as start,width,end
    #[arg(long, value_parser = parse_rebin_params, allow_hyphen_values = true)]
    params: RebinParams,

    /// Name of the rebinned workspace in the output document
    #[arg(long)]
    output_workspace: Option<String>,

    /// Write the JSON document here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct RebinAtXArgs {
    /// Workspace document
    #[arg(long)]
    workspaces: PathBuf,

    /// Name of the workspace to rebin
    #[arg(long)]
    input: String,

    /// X value whose bin width is used
    #[arg(long = "x-value", allow_hyphen_values = true)]
    x_value: f64,

    /// Bin width rounding: None or 10^n
    #[arg(long, default_value = "None", value_parser = parse_rounding)]
    rounding: BinWidthRounding,

    /// Name of the rebinned workspace in the output document
    #[arg(long)]
    output_workspace: Option<String>,

    /// Write the JSON document here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(super) fn run_evaluate_command(args: EvaluateArgs) -> Result<i32, CliError> {
    let job = load_job(&args.job)?;
    let workspace_path = resolve_workspace_path(args.workspaces, &job, &args.job)?;
    let mut store = load_store(&workspace_path)?;

    let mut factory = FunctionFactory::new();
    register_builtin_functions(&mut factory)?;
    let mut function = factory.create(&job.function)?;

    for (name, value) in &job.attributes {
        function.set_attribute(name, value.clone())?;
    }

    let mut parameter_sets = vec![BTreeMap::new()];
    parameter_sets.extend(job.scan.iter().cloned());

    let mut evaluations = Vec::with_capacity(parameter_sets.len());
    for overrides in parameter_sets {
        let mut parameters = job.parameters.clone();
        parameters.extend(overrides);
        for (name, value) in &parameters {
            function.set_parameter(name, *value)?;
        }
        let y = function.function_1d(&mut store, &job.x)?;
        let current = function
            .parameters()
            .iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        evaluations.push(EvaluationRecord {
            parameters: current,
            y,
        });
    }
    info!(
        function = job.function.as_str(),
        evaluations = evaluations.len(),
        "evaluation finished"
    );

    let report = EvaluationReport {
        function: job.function,
        x: job.x,
        evaluations,
    };
    emit_json(&report, args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_functions_command() -> Result<i32, CliError> {
    let mut factory = FunctionFactory::new();
    register_builtin_functions(&mut factory)?;
    for name in factory.names() {
        println!("{}\t{}", name, factory.category(name).unwrap_or("-"));
    }
    Ok(0)
}

pub(super) fn run_rebin_command(args: RebinArgs) -> Result<i32, CliError> {
    let store = load_store(&args.workspaces)?;
    let rebinned = rebin_workspace(store.get(&args.input)?, args.params)?;

    let output_name = args
        .output_workspace
        .unwrap_or_else(|| format!("{}_rebinned", args.input));
    let report = WorkspaceReport {
        bin_width: None,
        workspaces: BTreeMap::from([(output_name.as_str(), &rebinned)]),
    };
    emit_json(&report, args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_rebin_at_x_command(args: RebinAtXArgs) -> Result<i32, CliError> {
    let store = load_store(&args.workspaces)?;
    let result = rebin_to_bin_width_at_x(store.get(&args.input)?, args.x_value, args.rounding)?;
    info!(
        bin_width = result.bin_width,
        rounding = %args.rounding,
        "rebinned to bin width at X"
    );

    let output_name = args
        .output_workspace
        .unwrap_or_else(|| format!("{}_rebinned", args.input));
    let report = WorkspaceReport {
        bin_width: Some(result.bin_width),
        workspaces: BTreeMap::from([(output_name.as_str(), &result.workspace)]),
    };
    emit_json(&report, args.output.as_deref())?;
    Ok(0)
}

use dsf_core::algorithms::RebinParams;
use dsf_core::domain::{DsfErrorCategory, DsfResult};
use dsf_core::functions::{
    DsfInterp1DFit, FitFunction1D, FunctionFactory, INTENSITY, LOAD_ERRORS, LOCAL_REGRESSION,
    PARAMETER_VALUES, REBINNED_WORKSPACE, REGRESSION_TYPE, REGRESSION_WINDOW, TARGET_PARAMETER,
    WORKSPACE_INDEX, WORKSPACES, register_builtin_functions,
};
use dsf_core::workspace::{AnalysisHost, MatrixWorkspace, Spectrum, WorkspaceStore};
use std::collections::BTreeMap;

const GRID: [f64; 4] = [0.0, 1.0, 2.0, 3.0];

/// Store wrapper that records every rebin request.
#[derive(Default)]
struct CountingHost {
    store: WorkspaceStore,
    rebins: BTreeMap<String, usize>,
}

impl CountingHost {
    fn rebin_count(&self, name: &str) -> usize {
        self.rebins.get(name).copied().unwrap_or_default()
    }
}

impl AnalysisHost for CountingHost {
    fn histogram_count(&self, name: &str) -> DsfResult<usize> {
        self.store.histogram_count(name)
    }

    fn rebin(&mut self, input: &str, params: RebinParams, output: &str) -> DsfResult<()> {
        *self.rebins.entry(input.to_string()).or_default() += 1;
        self.store.rebin(input, params, output)
    }

    fn spectrum(&self, name: &str, index: usize) -> DsfResult<Spectrum> {
        self.store.spectrum(name, index)
    }

    fn discard(&mut self, name: &str) {
        self.store.discard(name);
    }
}

fn point_workspace(rows: &[Vec<f64>]) -> MatrixWorkspace {
    let spectra = rows
        .iter()
        .map(|y| {
            let errors = y.iter().map(|value| 0.1 * value.abs() + 0.01).collect();
            Spectrum::new(GRID.to_vec(), y.clone(), errors).expect("valid spectrum")
        })
        .collect();
    MatrixWorkspace::new(spectra, false)
}

fn constant_host(levels: &[(&str, f64)]) -> CountingHost {
    let mut host = CountingHost::default();
    for &(name, level) in levels {
        host.store
            .add(name, point_workspace(&[vec![level; GRID.len()]]))
            .expect("add workspace");
    }
    host
}

fn configured(workspaces: &str, values: &str) -> DsfInterp1DFit {
    let mut function = DsfInterp1DFit::new();
    function
        .set_attribute_str(WORKSPACES, workspaces)
        .expect("workspaces");
    function
        .set_attribute_str(PARAMETER_VALUES, values)
        .expect("parameter values");
    function
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1.0e-9, "index {index}: {a} != {e}");
    }
}

#[test]
fn non_positive_intensity_returns_zeros_without_initializing() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0 s1", "0.0 1.0");
    function.set_parameter(INTENSITY, -1.0).expect("intensity");

    let values = function.function_1d(&mut host, &GRID).expect("penalty");
    assert_eq!(values, vec![0.0; GRID.len()]);
    assert!(!function.is_initialized());
    assert_eq!(host.rebin_count("s0"), 0);
}

#[test]
fn target_outside_reference_range_returns_zeros() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0,s1", "0.0 1.0");
    function.set_parameter(TARGET_PARAMETER, 1.5).expect("target");

    let values = function.function_1d(&mut host, &GRID).expect("penalty");
    assert_eq!(values, vec![0.0; GRID.len()]);
}

#[test]
fn constant_references_interpolate_linearly_between_two_values() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0, s1", "0.0 1.0");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");
    function.set_parameter(INTENSITY, 1.5).expect("intensity");

    let values = function.function_1d(&mut host, &GRID).expect("evaluate");
    assert_close(&values, &[4.5; 4]);
    assert!(function.is_initialized());
    assert!(!host.store.contains(REBINNED_WORKSPACE));
}

#[test]
fn evaluating_at_a_knot_without_regression_returns_the_rebinned_reference() {
    let mut host = CountingHost::default();
    host.store
        .add("low", point_workspace(&[vec![1.0, 3.0, 2.0, 5.0]]))
        .expect("add");
    host.store
        .add("mid", point_workspace(&[vec![2.0, 1.0, 4.0, 0.5]]))
        .expect("add");
    host.store
        .add("high", point_workspace(&[vec![0.0, 2.5, 3.0, 1.0]]))
        .expect("add");

    let mut function = configured("low mid high", "0.2 0.5 0.9");
    function
        .set_attribute_str(LOCAL_REGRESSION, "false")
        .expect("local regression");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");
    function.set_parameter(INTENSITY, 2.0).expect("intensity");

    let values = function.function_1d(&mut host, &GRID).expect("evaluate");

    let params = RebinParams::centered_on(&GRID).expect("grid");
    host.store.rebin("mid", params, "expected").expect("rebin");
    let expected: Vec<f64> = host
        .store
        .spectrum("expected", 0)
        .expect("row")
        .y()
        .iter()
        .map(|value| 2.0 * value)
        .collect();
    assert_close(&values, &expected);
}

#[test]
fn workspace_index_selects_the_row_and_errors_are_loaded() {
    let mut host = CountingHost::default();
    host.store
        .add("a", point_workspace(&[vec![9.0; 4], vec![1.0, 2.0, 3.0, 4.0]]))
        .expect("add");
    host.store
        .add("b", point_workspace(&[vec![9.0; 4], vec![3.0, 4.0, 5.0, 6.0]]))
        .expect("add");

    let mut function = configured("a b", "1.0 2.0");
    function.set_attribute_str(WORKSPACE_INDEX, "1").expect("index");
    function.set_attribute_str(LOAD_ERRORS, "true").expect("errors");
    function.set_parameter(TARGET_PARAMETER, 1.5).expect("target");

    let values = function.function_1d(&mut host, &GRID).expect("evaluate");
    assert_close(&values, &[2.0, 3.0, 4.0, 5.0]);

    let interpolator = function.interpolator().expect("initialized");
    assert_eq!(interpolator.fvalue_range(), (1.0, 2.0));
    assert!(interpolator.evaluate(1.5).errors().is_some());
}

#[test]
fn workspace_index_beyond_histogram_count_is_fatal() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0 s1", "0.0 1.0");
    function.set_attribute_str(WORKSPACE_INDEX, "1").expect("index");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");

    let error = function
        .function_1d(&mut host, &GRID)
        .expect_err("index out of range");
    assert_eq!(error.category(), DsfErrorCategory::IndexOutOfBounds);
    assert!(
        error.message().contains("does not allow for workspace index 1"),
        "unexpected message: {}",
        error.message()
    );
    assert!(!function.is_initialized());
}

#[test]
fn mismatched_source_and_value_counts_fail_on_first_evaluation() {
    let mut host = constant_host(&[("s0", 1.0), ("s1", 2.0), ("s2", 3.0)]);
    let mut function = configured("s0 s1 s2", "0.0 1.0");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");

    let error = function
        .function_1d(&mut host, &GRID)
        .expect_err("count mismatch");
    assert_eq!(error.category(), DsfErrorCategory::CountMismatch);
    assert!(error.message().contains("Found 3 and 2"));
    assert_eq!(host.rebin_count("s0"), 0);
}

#[test]
fn unsupported_regression_type_fails_at_evaluation_not_configuration() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0 s1", "0.0 1.0");
    function
        .set_attribute_str(REGRESSION_TYPE, "cubic")
        .expect("any string is accepted at configuration");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");

    let error = function
        .function_1d(&mut host, &GRID)
        .expect_err("cubic is not implemented");
    assert_eq!(error.category(), DsfErrorCategory::NotImplemented);
    assert!(error.message().contains("cubic"));
    assert!(error.message().contains("linear, quadratic"));
}

#[test]
fn undersized_regression_window_is_rejected() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0 s1", "0.0 1.0");
    function
        .set_attribute_str(REGRESSION_WINDOW, "2")
        .expect("window");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");

    let error = function
        .function_1d(&mut host, &GRID)
        .expect_err("window too small");
    assert_eq!(error.category(), DsfErrorCategory::InvalidConfiguration);
    assert!(error.message().contains("equal or bigger than 4"));

    let mut linear = configured("s0 s1", "0.0 1.0");
    linear
        .set_attribute_str(REGRESSION_TYPE, "linear")
        .expect("type");
    linear.set_attribute_str(REGRESSION_WINDOW, "3").expect("window");
    linear.set_parameter(TARGET_PARAMETER, 0.5).expect("target");
    linear
        .function_1d(&mut host, &GRID)
        .expect("window 3 is enough for linear");
}

#[test]
fn interpolator_is_built_once_and_reused() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0 s1", "0.0 1.0");
    function.set_parameter(TARGET_PARAMETER, 0.25).expect("target");

    let first = function.function_1d(&mut host, &GRID).expect("first");
    assert_close(&first, &[2.5; 4]);

    function
        .set_attribute_str(REGRESSION_TYPE, "cubic")
        .expect("ignored after initialization");
    function.set_parameter(TARGET_PARAMETER, 0.75).expect("target");
    let shifted = [10.0, 20.0, 30.0, 40.0];
    let second = function.function_1d(&mut host, &shifted).expect("second");
    assert_close(&second, &[3.5; 4]);

    assert_eq!(host.rebin_count("s0"), 1);
    assert_eq!(host.rebin_count("s1"), 1);
}

#[test]
fn grid_length_change_after_initialization_is_an_error() {
    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let mut function = configured("s0 s1", "0.0 1.0");
    function.set_parameter(TARGET_PARAMETER, 0.5).expect("target");
    function.function_1d(&mut host, &GRID).expect("first");

    let error = function
        .function_1d(&mut host, &[0.0, 1.0])
        .expect_err("different grid length");
    assert_eq!(error.category(), DsfErrorCategory::ComputationError);
}

#[test]
fn factory_creates_working_instances() {
    let mut factory = FunctionFactory::new();
    register_builtin_functions(&mut factory).expect("register");
    let mut function = factory.create("DSFinterp1DFit").expect("create");
    assert_eq!(function.category(), "QENS");

    function
        .set_attribute_str(WORKSPACES, "s0 s1")
        .expect("workspaces");
    function
        .set_attribute_str(PARAMETER_VALUES, "0.0 1.0")
        .expect("values");
    function.set_parameter(TARGET_PARAMETER, 1.0).expect("target");

    let mut host = constant_host(&[("s0", 2.0), ("s1", 4.0)]);
    let values = function.function_1d(&mut host, &GRID).expect("evaluate");
    assert_close(&values, &[4.0; 4]);
}

pub mod clock;
pub mod dataset;
pub mod errors;
pub mod harness;
pub mod io;
pub mod observability;
pub mod report;
pub mod runner;
pub mod suite;
pub mod workloads;

use errors::BenchError;
use harness::{BenchmarkRun, BenchmarkSpec, TimingResult};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

/// Wall and CPU seconds of a measured sequence, as seen from Python
#[pyclass(name = "TimingResult", frozen)]
#[derive(Clone, Copy)]
pub struct PyTimingResult {
    inner: TimingResult,
}

#[pymethods]
impl PyTimingResult {
    #[getter]
    fn wall_time(&self) -> f64 {
        self.inner.wall_time()
    }

    #[getter]
    fn cpu_time(&self) -> f64 {
        self.inner.cpu_time()
    }

    fn __repr__(&self) -> String {
        format!(
            "TimingResult(wall_time={}, cpu_time={})",
            report::format_seconds(self.inner.wall_time()),
            report::format_seconds(self.inner.cpu_time())
        )
    }
}

/// Result of `measure`: the last value returned by the operation plus timing
#[pyclass(name = "BenchmarkRun", frozen)]
pub struct PyBenchmarkRun {
    run: BenchmarkRun<PyObject>,
}

#[pymethods]
impl PyBenchmarkRun {
    #[getter]
    fn result(&self, py: Python<'_>) -> PyObject {
        self.run.result().clone_ref(py)
    }

    #[getter]
    fn timing(&self) -> PyTimingResult {
        PyTimingResult {
            inner: self.run.timing(),
        }
    }

    #[getter]
    fn label(&self) -> Option<String> {
        self.run.label().map(str::to_owned)
    }

    #[getter]
    fn iterations(&self) -> u64 {
        self.run.iterations()
    }

    fn report(&self) -> String {
        report::report(&self.run)
    }

    fn report_json(&self) -> PyResult<String> {
        report::report_json(&self.run).map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        self.report()
    }
}

fn to_py_err(err: BenchError) -> PyErr {
    match err {
        // Hand the operation's own exception back unchanged.
        BenchError::OperationFailed { iteration, source } => match source.downcast::<PyErr>() {
            Ok(py_err) => py_err,
            Err(other) => {
                PyRuntimeError::new_err(format!("iteration {}: {:#}", iteration, other))
            }
        },
        BenchError::InvalidConfiguration(msg) => PyValueError::new_err(msg),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Call `op` `repeat_count` times and time the whole sequence
#[pyfunction(signature = (op, repeat_count=1, label=None))]
fn measure(
    op: &Bound<'_, PyAny>,
    repeat_count: i64,
    label: Option<String>,
) -> PyResult<PyBenchmarkRun> {
    let spec = BenchmarkSpec::new(|| op.call0().map(Bound::unbind))
        .repeat_count(repeat_count)
        .maybe_label(label);
    let run = harness::measure(spec).map_err(to_py_err)?;
    Ok(PyBenchmarkRun { run })
}

/// Generate the default random table as a Polars DataFrame (Python)
#[pyfunction(signature = (rows, seed=0))]
fn generate_dataset(py: Python<'_>, rows: usize, seed: u64) -> PyResult<PyObject> {
    let df = dataset::generate(&dataset::DatasetSpec::new(rows, seed)).map_err(to_py_err)?;
    let py_df = PyDataFrame(df);
    Ok(py_df.into_pyobject(py)?.into_any().unbind())
}

/// A Python module implemented in Rust.
#[pymodule]
fn framebench(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyTimingResult>()?;
    m.add_class::<PyBenchmarkRun>()?;
    m.add_function(wrap_pyfunction!(measure, m)?)?;
    m.add_function(wrap_pyfunction!(generate_dataset, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pyo3::exceptions::{PyKeyError, PyTypeError};

    #[test]
    fn test_invalid_configuration_is_value_error() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let err = to_py_err(BenchError::InvalidConfiguration("repeat_count".into()));
            assert!(err.is_instance_of::<PyValueError>(py));
            assert!(err.to_string().contains("repeat_count"));
        });
    }

    #[test]
    fn test_clock_error_is_runtime_error() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let err = to_py_err(BenchError::ClockError("went backwards".into()));
            assert!(err.is_instance_of::<PyRuntimeError>(py));
            assert!(err.to_string().contains("went backwards"));
        });
    }

    #[test]
    fn test_rust_operation_failure_names_iteration() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let err = to_py_err(BenchError::OperationFailed {
                iteration: 3,
                source: anyhow!("column missing"),
            });
            assert!(err.is_instance_of::<PyRuntimeError>(py));
            let msg = err.to_string();
            assert!(msg.contains("iteration 3"), "got {msg}");
            assert!(msg.contains("column missing"));
        });
    }

    #[test]
    fn test_python_exception_is_reraised() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let err = to_py_err(BenchError::OperationFailed {
                iteration: 1,
                source: PyKeyError::new_err("gone").into(),
            });
            assert!(err.is_instance_of::<PyKeyError>(py));
        });
    }

    #[test]
    fn test_measure_calls_python_callable() -> PyResult<()> {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let int = py.import("builtins")?.getattr("int")?;
            let run = measure(&int, 3, Some("int()".into()))?;
            assert_eq!(run.iterations(), 3);
            assert_eq!(run.result(py).extract::<i64>(py)?, 0);
            assert!(run.report().starts_with("int() (3 iterations)"));

            let json: serde_json::Value = serde_json::from_str(&run.report_json()?)
                .map_err(|e| PyValueError::new_err(e.to_string()))?;
            assert_eq!(json["iterations"], 3);
            Ok(())
        })
    }

    #[test]
    fn test_measure_reraises_operation_exception() -> PyResult<()> {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            // iter() without arguments raises TypeError.
            let iter = py.import("builtins")?.getattr("iter")?;
            let err = measure(&iter, 2, None).err().ok_or_else(|| {
                PyRuntimeError::new_err("measure should have failed")
            })?;
            assert!(err.is_instance_of::<PyTypeError>(py));

            let bad = measure(&iter, 0, None).err().ok_or_else(|| {
                PyRuntimeError::new_err("measure should have failed")
            })?;
            assert!(bad.is_instance_of::<PyValueError>(py));
            Ok(())
        })
    }
}

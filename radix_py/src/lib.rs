/*!
# Radix Py - Python bindings for the radix core

Exposes the exact base converter and the 32-bit bit field to Python hosts
(notebooks, teaching scripts, UI prototypes).

## Usage

```python
import radix_py

radix_py.convert("18446744073709551616", "dec")
# {'dec': '18446744073709551616', 'bin': '1000...', 'oct': '2000...', 'hex': '10000000000000000'}

print(radix_py.explain("FF", "hex", "bin"))

bits = radix_py.BitField32("-1").shift_left().rotate_right()
print(bits.signed, bits.hex)
```
*/

use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3::Bound;
use radix_core::{BitField32, BitIndex, Radix};
use std::fmt::Display;
use tracing::debug;

fn value_error(e: impl Display) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

fn parse_radix(name: &str) -> PyResult<Radix> {
    name.parse::<Radix>().map_err(value_error)
}

/// Convert a digit string into all four radices.
///
/// Args:
///     digits: Digits as typed (empty string clears every field)
///     radix: Radix of `digits`: "bin", "oct", "dec" or "hex" (default "dec")
///
/// Returns:
///     Dict keyed by "dec", "bin", "oct", "hex"
///
/// Raises:
///     ValueError: with the user-facing message when the digits are invalid
#[pyfunction(name = "convert")]
#[pyo3(signature = (digits, radix="dec"))]
fn py_convert<'py>(py: Python<'py>, digits: &str, radix: &str) -> PyResult<Bound<'py, PyDict>> {
    let source = parse_radix(radix)?;
    let result = radix_core::convert(source, digits);

    if let Some(error) = result.error() {
        return Err(value_error(error));
    }

    let dict = PyDict::new_bound(py);
    for (radix, value) in result.values() {
        dict.set_item(radix.key(), value)?;
    }

    Ok(dict)
}

/// Explain one conversion step by step.
///
/// Args:
///     digits: Valid, non-empty digits in `source`
///     source: Source radix name
///     target: Target radix name
///     html: Use <sup>/<sub> markup (default False)
#[pyfunction(name = "explain")]
#[pyo3(signature = (digits, source, target, html=false))]
fn py_explain(digits: &str, source: &str, target: &str, html: bool) -> PyResult<String> {
    let trace = radix_core::explain(parse_radix(source)?, parse_radix(target)?, digits)
        .map_err(value_error)?;

    Ok(if html { trace.to_html() } else { trace.to_string() })
}

/// Traces from `source` to each other radix, as plain text
#[pyfunction(name = "explain_all")]
#[pyo3(signature = (digits, source))]
fn py_explain_all(digits: &str, source: &str) -> PyResult<Vec<String>> {
    let traces = radix_core::explain_all(parse_radix(source)?, digits).map_err(value_error)?;
    Ok(traces.iter().map(ToString::to_string).collect())
}

/// Python wrapper for the Rust BitField32 value.
///
/// Every operation returns a new object; the receiver is never modified.
#[pyclass(name = "BitField32", frozen)]
#[derive(Clone)]
pub struct PyBitField32 {
    inner: BitField32,
}

impl From<BitField32> for PyBitField32 {
    fn from(inner: BitField32) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyBitField32 {
    /// Create a field from integer text (empty or non-numeric text gives zero)
    #[new]
    #[pyo3(signature = (value=None))]
    fn new(value: Option<&str>) -> Self {
        value.map(BitField32::parse_integer).unwrap_or_default().into()
    }

    /// Create a field from a Python int of any size, reduced modulo 2^32
    #[staticmethod]
    fn from_int(value: &Bound<'_, PyAny>) -> PyResult<Self> {
        let text = value.str()?;
        let text = text.to_cow()?;
        BitField32::try_parse_integer(&text)
            .map(Self::from)
            .ok_or_else(|| value_error(format!("not an integer: {}", text)))
    }

    fn toggle(&self, index: usize) -> PyResult<Self> {
        let index = BitIndex::try_from(index).map_err(|e| PyErr::new::<PyIndexError, _>(e.to_string()))?;
        Ok(self.inner.toggle(index).into())
    }

    fn invert(&self) -> Self {
        self.inner.invert().into()
    }

    fn shift_left(&self) -> Self {
        self.inner.shift_left().into()
    }

    fn shift_right(&self) -> Self {
        self.inner.shift_right().into()
    }

    fn rotate_left(&self) -> Self {
        self.inner.rotate_left().into()
    }

    fn rotate_right(&self) -> Self {
        self.inner.rotate_right().into()
    }

    fn set_all(&self) -> Self {
        self.inner.set_all().into()
    }

    fn clear_all(&self) -> Self {
        self.inner.clear_all().into()
    }

    /// Apply a sequence of operation tokens ("shl", "toggle:3", "set:-1", ...)
    fn apply(&self, ops: Vec<String>) -> PyResult<Self> {
        let mut field = self.inner;
        for token in &ops {
            let op = token.parse().map_err(value_error)?;
            field = field.apply(&op);
        }
        debug!(count = ops.len(), hex = %field.hex(), "applied ops from python");
        Ok(field.into())
    }

    /// Bits, most significant first
    #[getter]
    fn bits(&self) -> Vec<u8> {
        self.inner.bits().to_vec()
    }

    #[getter]
    fn unsigned(&self) -> u32 {
        self.inner.unsigned()
    }

    #[getter]
    fn signed(&self) -> i32 {
        self.inner.signed()
    }

    #[getter]
    fn hex(&self) -> String {
        self.inner.hex()
    }

    /// Binary digits split into groups of `width`
    #[pyo3(signature = (width=8))]
    fn grouped(&self, width: usize) -> String {
        self.inner.grouped(width)
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.inner == other.inner
    }

    fn __repr__(&self) -> String {
        format!("BitField32(0x{}, signed={})", self.inner.hex(), self.inner.signed())
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

/// Python module definition
#[pymodule]
fn radix_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_convert, m)?)?;
    m.add_function(wrap_pyfunction!(py_explain, m)?)?;
    m.add_function(wrap_pyfunction!(py_explain_all, m)?)?;
    m.add_class::<PyBitField32>()?;
    m.add("__version__", radix_core::VERSION)?;

    // Add module docstring
    m.add("__doc__", "Exact multi-base number conversion and 32-bit bit manipulation")?;

    Ok(())
}

//! Python Bindings
//!
//! A thin `Graph` class over the native store. Ids cross the boundary as
//! plain integers; property values map to `bool`, `int`, `float` and `str`.

use pyo3::exceptions::{PyKeyError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::error::GraphError;
use crate::graph::{Graph, NodeId, RelationId};
use crate::value::PropertyValue;

fn to_py_err(err: GraphError) -> PyErr {
    match err {
        GraphError::AlreadyDeleted(..) => PyKeyError::new_err(err.to_string()),
        GraphError::HasRelations(_) | GraphError::MissingEndpoint(_) => {
            PyValueError::new_err(err.to_string())
        }
    }
}

fn extract_value(value: &Bound<'_, PyAny>) -> PyResult<PropertyValue> {
    // bool before int: Python's bool is an int subclass.
    if let Ok(v) = value.extract::<bool>() {
        return Ok(PropertyValue::Bool(v));
    }
    if let Ok(v) = value.extract::<i64>() {
        return Ok(PropertyValue::Int(v));
    }
    if let Ok(v) = value.extract::<f64>() {
        return Ok(PropertyValue::Float(v));
    }
    if let Ok(v) = value.extract::<String>() {
        return Ok(PropertyValue::Text(v));
    }
    Err(PyTypeError::new_err(format!(
        "unsupported property type: {}",
        value.get_type().name()?
    )))
}

fn to_py_dict<'py>(
    py: Python<'py>,
    props: indexmap::IndexMap<String, PropertyValue>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (key, value) in props {
        let value: PyObject = match value {
            PropertyValue::Bool(v) => v.into_py(py),
            PropertyValue::Int(v) => v.into_py(py),
            PropertyValue::Float(v) => v.into_py(py),
            PropertyValue::Text(v) => v.into_py(py),
        };
        dict.set_item(key, value)?;
    }
    Ok(dict)
}

/// Python-exposed graph.
#[pyclass(name = "Graph")]
pub struct PyGraph {
    inner: Graph,
}

#[pymethods]
impl PyGraph {
    #[new]
    fn new() -> Self {
        Self {
            inner: Graph::new(),
        }
    }

    fn add_node(&mut self, label: String) -> usize {
        self.inner.add_node(label).index()
    }

    fn delete_node(&mut self, id: usize) -> PyResult<()> {
        self.inner.delete_node(NodeId::from(id)).map_err(to_py_err)
    }

    fn node_label(&self, id: usize) -> PyResult<String> {
        self.inner
            .node(NodeId::from(id))
            .map(|node| node.label().to_owned())
            .ok_or_else(|| to_py_err(GraphError::deleted_node(NodeId::from(id))))
    }

    fn node_ids(&self) -> Vec<usize> {
        self.inner.nodes().map(|node| node.id().index()).collect()
    }

    fn add_relation(&mut self, source: usize, target: usize) -> PyResult<usize> {
        self.inner
            .add_relation(NodeId::from(source), NodeId::from(target))
            .map(RelationId::index)
            .map_err(to_py_err)
    }

    fn delete_relation(&mut self, id: usize) -> PyResult<()> {
        self.inner
            .delete_relation(RelationId::from(id))
            .map_err(to_py_err)
    }

    fn node_relations(&self, id: usize) -> PyResult<Vec<usize>> {
        let node = self
            .inner
            .node(NodeId::from(id))
            .ok_or_else(|| to_py_err(GraphError::deleted_node(NodeId::from(id))))?;
        Ok(node.relations().map(|r| r.id().index()).collect())
    }

    #[getter]
    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    #[getter]
    fn relation_count(&self) -> usize {
        self.inner.relation_count()
    }

    fn set_node_property(&mut self, id: usize, key: String, value: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = extract_value(value)?;
        self.inner
            .set_node_property(NodeId::from(id), key, value)
            .map_err(to_py_err)
    }

    fn del_node_property(&mut self, id: usize, key: &str) -> PyResult<bool> {
        self.inner
            .del_node_property(NodeId::from(id), key)
            .map_err(to_py_err)
    }

    fn node_properties<'py>(&self, py: Python<'py>, id: usize) -> PyResult<Bound<'py, PyDict>> {
        let props = self
            .inner
            .node_properties(NodeId::from(id))
            .map_err(to_py_err)?;
        to_py_dict(py, props)
    }

    fn set_relation_property(
        &mut self,
        id: usize,
        key: String,
        value: &Bound<'_, PyAny>,
    ) -> PyResult<()> {
        let value = extract_value(value)?;
        self.inner
            .set_relation_property(RelationId::from(id), key, value)
            .map_err(to_py_err)
    }

    fn del_relation_property(&mut self, id: usize, key: &str) -> PyResult<bool> {
        self.inner
            .del_relation_property(RelationId::from(id), key)
            .map_err(to_py_err)
    }

    fn relation_properties<'py>(&self, py: Python<'py>, id: usize) -> PyResult<Bound<'py, PyDict>> {
        let props = self
            .inner
            .relation_properties(RelationId::from(id))
            .map_err(to_py_err)?;
        to_py_dict(py, props)
    }

    fn __repr__(&self) -> String {
        format!(
            "Graph(nodes={}, relations={})",
            self.inner.node_count(),
            self.inner.relation_count()
        )
    }
}

/// Python module definition.
///
/// This function is called by Python when importing the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGraph>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

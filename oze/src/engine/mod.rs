//! Boundary with the external geoprocessing engine.
//!
//! Every geometric, raster and attribute operation is executed by an
//! engine algorithm identified by its id (e.g. `native:buffer`). The
//! pipeline only builds an [`Invocation`] and waits for the engine to
//! return; the engine writes its result at the requested output path.

pub mod qgis_process;
pub mod recording;

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use qgis_process::QgisProcess;
pub use recording::RecordingEngine;

/// Errors raised at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    /// Parameters rejected before dispatch
    #[error("invalid parameters for {algorithm}: {reason}")]
    InvalidParameters {
        algorithm: &'static str,
        reason: String,
    },

    /// Engine executable could not be started
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Engine ran and reported a failure
    #[error("{algorithm} failed (exit code {code:?}): {stderr}")]
    Failed {
        algorithm: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Engine returned success but the output file is absent
    #[error("{algorithm} reported success but {path:?} was not written")]
    MissingOutput { algorithm: String, path: PathBuf },

    #[error("failed to encode parameters: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Named parameter set passed to an engine algorithm
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Parameters(Map::new())
    }

    pub fn path(self, key: &str, path: &Path) -> Self {
        self.value(key, Value::String(path.to_string_lossy().into_owned()))
    }

    pub fn paths<P: AsRef<Path>>(self, key: &str, paths: &[P]) -> Self {
        let list = paths
            .iter()
            .map(|p| Value::String(p.as_ref().to_string_lossy().into_owned()))
            .collect();
        self.value(key, Value::Array(list))
    }

    pub fn text(self, key: &str, text: &str) -> Self {
        self.value(key, Value::String(text.to_string()))
    }

    pub fn texts(self, key: &str, texts: &[String]) -> Self {
        let list = texts.iter().cloned().map(Value::String).collect();
        self.value(key, Value::Array(list))
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.value(key, Value::from(value))
    }

    pub fn number(self, key: &str, value: f64) -> Self {
        self.value(key, Value::from(value))
    }

    pub fn flag(self, key: &str, value: bool) -> Self {
        self.value(key, Value::Bool(value))
    }

    fn value(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a parameter, if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One call into the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub algorithm: &'static str,
    pub parameters: Parameters,
    /// File the algorithm is expected to produce
    #[serde(skip)]
    pub output: PathBuf,
}

impl Invocation {
    pub fn new(algorithm: &'static str, parameters: Parameters, output: PathBuf) -> Self {
        Invocation {
            algorithm,
            parameters,
            output,
        }
    }
}

/// Synchronous executor of engine algorithms
pub trait Geoprocessor {
    /// Run the algorithm to completion. Returns once the output is written.
    fn run(&mut self, invocation: &Invocation) -> Result<(), EngineError>;
}

impl<G: Geoprocessor + ?Sized> Geoprocessor for &mut G {
    fn run(&mut self, invocation: &Invocation) -> Result<(), EngineError> {
        (**self).run(invocation)
    }
}

impl<G: Geoprocessor + ?Sized> Geoprocessor for Box<G> {
    fn run(&mut self, invocation: &Invocation) -> Result<(), EngineError> {
        (**self).run(invocation)
    }
}

use std::path::{Path, PathBuf};

use super::{require_field, require_positive, Algorithm};
use crate::engine::Parameters;
use crate::expression::{FilterExpr, Literal};

/// Merge N vector layers into one, reprojected to `crs`
#[derive(Debug, Clone)]
pub struct MergeVectorLayers {
    pub layers: Vec<PathBuf>,
    pub crs: String,
    pub output: PathBuf,
}

impl Algorithm for MergeVectorLayers {
    const ID: &'static str = "native:mergevectorlayers";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .paths("LAYERS", &self.layers)
            .text("CRS", &self.crs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("LAYERS must list at least one layer".to_string());
        }
        require_field("CRS", &self.crs)
    }
}

/// Repair invalid geometries (structure method)
#[derive(Debug, Clone)]
pub struct FixGeometries {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for FixGeometries {
    const ID: &'static str = "native:fixgeometries";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new().path("INPUT", &self.input).int("METHOD", 1)
    }
}

/// Split multi-part geometries into single parts
#[derive(Debug, Clone)]
pub struct MultipartToSingleparts {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for MultipartToSingleparts {
    const ID: &'static str = "native:multiparttosingleparts";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new().path("INPUT", &self.input)
    }
}

/// Collect all features into one multi-part feature
#[derive(Debug, Clone)]
pub struct Collect {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for Collect {
    const ID: &'static str = "native:collect";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .texts("FIELD", &[])
    }
}

/// Dissolved fixed-distance buffer
#[derive(Debug, Clone)]
pub struct Buffer {
    pub input: PathBuf,
    pub distance: f64,
    pub output: PathBuf,
}

impl Algorithm for Buffer {
    const ID: &'static str = "native:buffer";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .number("DISTANCE", self.distance)
            .int("SEGMENTS", 5)
            .int("END_CAP_STYLE", 0)
            .int("JOIN_STYLE", 0)
            .int("MITER_LIMIT", 2)
            .flag("DISSOLVE", true)
    }

    fn validate(&self) -> Result<(), String> {
        require_positive("DISTANCE", self.distance)
    }
}

/// Keep features matching a filter expression
#[derive(Debug, Clone)]
pub struct ExtractByExpression {
    pub input: PathBuf,
    pub expression: FilterExpr,
    pub output: PathBuf,
}

impl Algorithm for ExtractByExpression {
    const ID: &'static str = "native:extractbyexpression";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .text("EXPRESSION", &self.expression.to_string())
    }

    fn validate(&self) -> Result<(), String> {
        require_field("expression field", &self.expression.field)?;
        if let Literal::Number(n) = self.expression.value {
            if !n.is_finite() {
                return Err(format!(
                    "expression literal for {} must be finite, got {}",
                    self.expression.field, n
                ));
            }
        }
        Ok(())
    }
}

/// Geometric intersection
/// Empty field lists keep every field of that side.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub input: PathBuf,
    pub overlay: PathBuf,
    pub input_fields: Vec<String>,
    pub overlay_fields: Vec<String>,
    pub overlay_fields_prefix: String,
    pub output: PathBuf,
}

impl Intersection {
    pub fn new(input: PathBuf, overlay: PathBuf, output: PathBuf) -> Self {
        Intersection {
            input,
            overlay,
            input_fields: Vec::new(),
            overlay_fields: Vec::new(),
            overlay_fields_prefix: String::new(),
            output,
        }
    }

    pub fn with_overlay_fields(mut self, fields: &[&str]) -> Self {
        self.overlay_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

impl Algorithm for Intersection {
    const ID: &'static str = "native:intersection";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .path("OVERLAY", &self.overlay)
            .texts("INPUT_FIELDS", &self.input_fields)
            .texts("OVERLAY_FIELDS", &self.overlay_fields)
            .text("OVERLAY_FIELDS_PREFIX", &self.overlay_fields_prefix)
    }

    fn validate(&self) -> Result<(), String> {
        self.input_fields
            .iter()
            .chain(&self.overlay_fields)
            .try_for_each(|f| require_field("field name", f))
    }
}

/// Parts of `input` not covered by `overlay`
#[derive(Debug, Clone)]
pub struct Difference {
    pub input: PathBuf,
    pub overlay: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for Difference {
    const ID: &'static str = "native:difference";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .path("OVERLAY", &self.overlay)
    }
}

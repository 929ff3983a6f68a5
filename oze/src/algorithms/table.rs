use std::path::{Path, PathBuf};

use super::{require_field, Algorithm};
use crate::engine::Parameters;

/// Shortest line from every source feature to its nearest destination
/// feature. The output carries the source attributes plus `distance`.
#[derive(Debug, Clone)]
pub struct ShortestLine {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for ShortestLine {
    const ID: &'static str = "native:shortestline";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("SOURCE", &self.source)
            .path("DESTINATION", &self.destination)
            .int("METHOD", 0)
            .int("NEIGHBORS", 1)
    }
}

/// Copy columns from `join` onto `input` by key, one-to-one, dropping
/// features without a match
#[derive(Debug, Clone)]
pub struct JoinAttributesTable {
    pub input: PathBuf,
    pub field: String,
    pub join: PathBuf,
    pub join_field: String,
    pub fields_to_copy: Vec<String>,
    pub output: PathBuf,
}

impl JoinAttributesTable {
    /// Join on `ID` on both sides
    pub fn by_id(input: PathBuf, join: PathBuf, copy: &str, output: PathBuf) -> Self {
        JoinAttributesTable {
            input,
            field: "ID".to_string(),
            join,
            join_field: "ID".to_string(),
            fields_to_copy: vec![copy.to_string()],
            output,
        }
    }
}

impl Algorithm for JoinAttributesTable {
    const ID: &'static str = "native:joinattributestable";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .text("FIELD", &self.field)
            .path("INPUT_2", &self.join)
            .text("FIELD_2", &self.join_field)
            .texts("FIELDS_TO_COPY", &self.fields_to_copy)
            .int("METHOD", 1)
            .flag("DISCARD_NONMATCHING", true)
            .text("PREFIX", "")
    }

    fn validate(&self) -> Result<(), String> {
        require_field("FIELD", &self.field)?;
        require_field("FIELD_2", &self.join_field)?;
        if self.fields_to_copy.is_empty() {
            return Err("FIELDS_TO_COPY must name at least one field".to_string());
        }
        self.fields_to_copy
            .iter()
            .try_for_each(|f| require_field("FIELDS_TO_COPY", f))
    }
}

/// Rename one attribute field
#[derive(Debug, Clone)]
pub struct RenameField {
    pub input: PathBuf,
    pub field: String,
    pub new_name: String,
    pub output: PathBuf,
}

impl Algorithm for RenameField {
    const ID: &'static str = "native:renametablefield";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .text("FIELD", &self.field)
            .text("NEW_NAME", &self.new_name)
    }

    fn validate(&self) -> Result<(), String> {
        require_field("FIELD", &self.field)?;
        require_field("NEW_NAME", &self.new_name)?;
        if self.field == self.new_name {
            return Err(format!("field {} renamed to itself", self.field));
        }
        Ok(())
    }
}

/// Field type codes of the field calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Float = 0,
    Integer = 1,
    Text = 2,
}

/// Add a computed field
#[derive(Debug, Clone)]
pub struct FieldCalculator {
    pub input: PathBuf,
    pub field_name: String,
    pub field_type: FieldType,
    pub field_length: u32,
    pub field_precision: u32,
    pub formula: String,
    pub output: PathBuf,
}

impl FieldCalculator {
    /// Sequential integer `ID` from the feature id
    pub fn feature_id(input: PathBuf, output: PathBuf) -> Self {
        FieldCalculator {
            input,
            field_name: "ID".to_string(),
            field_type: FieldType::Integer,
            field_length: 10,
            field_precision: 0,
            formula: "$id".to_string(),
            output,
        }
    }

    /// Planar area in map units into `AREA`
    pub fn area(input: PathBuf, output: PathBuf) -> Self {
        FieldCalculator {
            input,
            field_name: "AREA".to_string(),
            field_type: FieldType::Float,
            field_length: 10,
            field_precision: 2,
            formula: "$area".to_string(),
            output,
        }
    }
}

impl Algorithm for FieldCalculator {
    const ID: &'static str = "native:fieldcalculator";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .text("FIELD_NAME", &self.field_name)
            .int("FIELD_TYPE", self.field_type as i64)
            .int("FIELD_LENGTH", i64::from(self.field_length))
            .int("FIELD_PRECISION", i64::from(self.field_precision))
            .text("FORMULA", &self.formula)
    }

    fn validate(&self) -> Result<(), String> {
        require_field("FIELD_NAME", &self.field_name)?;
        require_field("FORMULA", &self.formula)?;
        if self.field_length == 0 {
            return Err("FIELD_LENGTH must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_by_id_discards_nonmatching() {
        let join = JoinAttributesTable::by_id(
            PathBuf::from("area_id.shp"),
            PathBuf::from("distance.shp"),
            "distance",
            PathBuf::from("out.shp"),
        );
        let invocation = join.invocation().unwrap();
        let params = &invocation.parameters;
        assert_eq!(params.get_str("FIELD"), Some("ID"));
        assert_eq!(params.get_str("FIELD_2"), Some("ID"));
        assert_eq!(params.get("DISCARD_NONMATCHING").unwrap(), true);
        assert_eq!(params.get("METHOD").unwrap(), 1);
        assert_eq!(params.get("FIELDS_TO_COPY").unwrap()[0], "distance");
    }

    #[test]
    fn test_rename_rejects_same_name() {
        let rename = RenameField {
            input: PathBuf::from("a.shp"),
            field: "distance".to_string(),
            new_name: "distance".to_string(),
            output: PathBuf::from("b.shp"),
        };
        assert!(rename.invocation().is_err());
    }

    #[test]
    fn test_area_and_id_formulas() {
        let area = FieldCalculator::area(PathBuf::from("a.shp"), PathBuf::from("b.shp"));
        let params = area.invocation().unwrap().parameters;
        assert_eq!(params.get_str("FORMULA"), Some("$area"));
        assert_eq!(params.get("FIELD_TYPE").unwrap(), 0);

        let id = FieldCalculator::feature_id(PathBuf::from("a.shp"), PathBuf::from("b.shp"));
        let params = id.invocation().unwrap().parameters;
        assert_eq!(params.get_str("FIELD_NAME"), Some("ID"));
        assert_eq!(params.get("FIELD_TYPE").unwrap(), 1);
    }
}

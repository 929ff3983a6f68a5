//! Attribute filters and the aspect reclassification rule.
//!
//! Filters are rendered into the engine's expression language, which does
//! the actual evaluation. [`FilterExpr::matches`] and
//! [`AspectWindow::classify`] evaluate the same rules locally so the
//! thresholds can be checked without the engine.

use std::fmt;

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn holds<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

/// Right-hand side of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

/// Attribute value of a feature, for local evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue<'a> {
    Number(f64),
    Text(&'a str),
    Null,
}

/// `"<field>" <op> <literal>` filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub field: String,
    pub op: CmpOp,
    pub value: Literal,
}

impl FilterExpr {
    pub fn number(field: &str, op: CmpOp, value: f64) -> Self {
        FilterExpr {
            field: field.to_string(),
            op,
            value: Literal::Number(value),
        }
    }

    pub fn text(field: &str, op: CmpOp, value: &str) -> Self {
        FilterExpr {
            field: field.to_string(),
            op,
            value: Literal::Text(value.to_string()),
        }
    }

    /// `"AREA" > min_area`
    pub fn area_above(min_area: f64) -> Self {
        FilterExpr::number("AREA", CmpOp::Gt, min_area)
    }

    /// `"distance" < max_distance`
    pub fn distance_below(max_distance: f64) -> Self {
        FilterExpr::number("distance", CmpOp::Lt, max_distance)
    }

    /// Evaluate against one attribute value. NULL never matches, and a
    /// number never equals text.
    pub fn matches(&self, value: AttrValue<'_>) -> bool {
        match (&self.value, value) {
            (Literal::Number(rhs), AttrValue::Number(lhs)) => self.op.holds(&lhs, rhs),
            (Literal::Text(rhs), AttrValue::Text(lhs)) => self.op.holds(lhs, rhs.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {} ", self.field, self.op.symbol())?;
        match &self.value {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// Aspect range, in degrees, counted as favorable exposure
/// Both bounds are exclusive: a cell is favorable iff `lower < aspect < upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectWindow {
    pub lower: f64,
    pub upper: f64,
}

impl Default for AspectWindow {
    fn default() -> Self {
        AspectWindow {
            lower: 215.0,
            upper: 315.0,
        }
    }
}

impl AspectWindow {
    pub fn classify(&self, aspect: f64) -> u8 {
        u8::from(aspect > self.lower && aspect < self.upper)
    }

    /// Raster calculator expression for band 1 of `layer`
    pub fn raster_expression(&self, layer: &str) -> String {
        let band = format!("\"{}@1\"", layer);
        format!(
            "({b} > {lo} AND {b} < {hi}) * 1 + ({b} <= {lo} OR {b} >= {hi}) * 0",
            b = band,
            lo = self.lower,
            hi = self.upper
        )
    }

    pub fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_filter_is_strict() {
        let filter = FilterExpr::area_above(20000.0);
        assert_eq!(filter.to_string(), "\"AREA\" > 20000");
        assert!(!filter.matches(AttrValue::Number(20000.0)));
        assert!(filter.matches(AttrValue::Number(20001.0)));
        assert!(!filter.matches(AttrValue::Null));
    }

    #[test]
    fn test_distance_filter() {
        let filter = FilterExpr::distance_below(500.0);
        assert_eq!(filter.to_string(), "\"distance\" < 500");
        assert!(filter.matches(AttrValue::Number(499.9)));
        assert!(!filter.matches(AttrValue::Number(500.0)));
    }

    #[test]
    fn test_text_literal_is_quoted() {
        let filter = FilterExpr::text("RODZAJ", CmpOp::Eq, "l'inia");
        assert_eq!(filter.to_string(), "\"RODZAJ\" = 'l''inia'");
        assert!(filter.matches(AttrValue::Text("l'inia")));
        assert!(!filter.matches(AttrValue::Number(1.0)));
    }

    #[test]
    fn test_aspect_bounds_are_exclusive() {
        let window = AspectWindow::default();
        assert_eq!(window.classify(215.0), 0);
        assert_eq!(window.classify(215.01), 1);
        assert_eq!(window.classify(314.99), 1);
        assert_eq!(window.classify(315.0), 0);
        assert_eq!(window.classify(90.0), 0);
    }

    #[test]
    fn test_raster_expression() {
        let expr = AspectWindow::default().raster_expression("lodzkie_aspect");
        assert_eq!(
            expr,
            "(\"lodzkie_aspect@1\" > 215 AND \"lodzkie_aspect@1\" < 315) * 1 + \
             (\"lodzkie_aspect@1\" <= 215 OR \"lodzkie_aspect@1\" >= 315) * 0"
        );
    }

    #[test]
    fn test_inverted_window_is_invalid() {
        let window = AspectWindow {
            lower: 315.0,
            upper: 215.0,
        };
        assert!(!window.is_valid());
    }
}

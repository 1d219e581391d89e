// Typed caller input: which columns of which tables go into which panel
use super::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

/// Columns picked from one table. Becomes exactly one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSelection {
    pub table: String,
    pub columns: Vec<String>,
}

impl TableSelection {
    #[cfg(test)]
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(DashboardError::Validation("table name is empty".to_string()));
        }
        if self.columns.is_empty() {
            return Err(DashboardError::Validation(format!(
                "no columns selected for table {}",
                self.table
            )));
        }
        Ok(())
    }
}

/// Replacement selections for an existing panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSelection {
    pub panel_id: i64,
    pub tables: Vec<TableSelection>,
}

/// Optional y-axis bounds; an absent side leaves the panel's bound as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl YBounds {
    /// Parses form-style text bounds. Blank means absent.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        Ok(Self {
            min: parse_bound("min", min)?,
            max: parse_bound("max", max)?,
        })
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(DashboardError::Validation(format!(
            "y {} bound is not a number: {}",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_y_bounds() {
        let bounds = YBounds::parse(None, Some("5")).unwrap();
        assert_eq!(bounds, YBounds { min: None, max: Some(5.0) });

        let bounds = YBounds::parse(Some(" "), Some("-2.5")).unwrap();
        assert_eq!(bounds.min, None);
        assert_eq!(bounds.max, Some(-2.5));

        assert_eq!(YBounds::parse(None, None).unwrap(), YBounds::default());
    }

    #[test]
    fn test_parse_y_bounds_rejects_text() {
        let err = YBounds::parse(Some("ten"), None).unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));

        assert!(YBounds::parse(None, Some("NaN")).is_err());
    }

    #[test]
    fn test_table_selection_validate() {
        assert!(TableSelection::new("t000005", vec!["c01".to_string()]).validate().is_ok());
        assert!(TableSelection::new("t000005", vec![]).validate().is_err());
        assert!(TableSelection::new("  ", vec!["c01".to_string()]).validate().is_err());
    }
}

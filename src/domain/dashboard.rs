// Dashboard document model
//
// Mirrors the subset of the platform's dashboard JSON this service edits.
// Every struct keeps the fields it does not model in `extra`, so a
// fetch-mutate-resubmit cycle writes back exactly what it fetched.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Which organization (and therefore which bearer credential) a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Org {
    Temp,
    Main,
}

impl std::fmt::Display for Org {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Org::Temp => write!(f, "temp"),
            Org::Main => write!(f, "main"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub time: TimeRange,
    #[serde(rename = "schemaVersion", default)]
    pub schema_version: i64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub refresh: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dashboard {
    pub fn panel(&self, panel_id: i64) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == panel_id)
    }

    /// First panel with the given id. Ids are unique within a dashboard.
    pub fn panel_mut(&mut self, panel_id: i64) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id == panel_id)
    }

    pub fn has_panel(&self, panel_id: i64) -> bool {
        self.panel(panel_id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            from: "now-24h".to_string(),
            to: "now".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "fieldConfig", default)]
    pub field_config: FieldConfig,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub defaults: FieldDefaults,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Axis bounds read leniently: older dashboards carry form text such as
/// `"5"` or `""`. Numeric text becomes a number and blank text means unset.
/// Anything else stays in `extra` under its own key and is written back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDefaults {
    pub fn set_min(&mut self, min: f64) {
        self.extra.remove("min");
        self.min = Some(min);
    }

    pub fn set_max(&mut self, max: f64) {
        self.extra.remove("max");
        self.max = Some(max);
    }
}

impl<'de> Deserialize<'de> for FieldDefaults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;
        let min = take_bound(&mut extra, "min");
        let max = take_bound(&mut extra, "max");
        Ok(Self { min, max, extra })
    }
}

fn take_bound(fields: &mut Map<String, Value>, key: &str) -> Option<f64> {
    let raw = fields.remove(key)?;
    match &raw {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                fields.insert(key.to_string(), raw);
                None
            }
        },
        _ => {
            fields.insert(key.to_string(), raw);
            None
        }
    }
}

/// One data-source query bound to a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "refId", default)]
    pub ref_id: String,
    #[serde(rename = "rawSql", default, skip_serializing_if = "String::is_empty")]
    pub raw_sql: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub table: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub select: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Target {
    /// Column identifiers recorded in the target's select clause, in order.
    #[cfg(test)]
    pub fn columns(&self) -> Vec<String> {
        self.select
            .get(0)
            .and_then(|group| group.get(0))
            .and_then(|part| part.get("params"))
            .and_then(Value::as_array)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|p| p.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Search hit for a dashboard: identifier plus display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub uid: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": 12,
            "uid": "abc",
            "title": "Reactor",
            "tags": [],
            "panels": [{
                "id": 3,
                "title": "Temps",
                "type": "timeseries",
                "gridPos": {"h": 8, "w": 12, "x": 0, "y": 0},
                "fieldConfig": {"defaults": {"min": 1.0, "unit": "celsius"}, "overrides": []},
                "targets": [{"refId": "A", "expr": "up", "datasource": "prom"}]
            }],
            "time": {"from": "now-6h", "to": "now"},
            "schemaVersion": 36,
            "version": 4,
            "timezone": "browser"
        });

        let dashboard: Dashboard = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(dashboard.panels[0].field_config.defaults.min, Some(1.0));
        assert_eq!(dashboard.extra.get("version"), Some(&json!(4)));

        let back = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_legacy_text_bounds_are_read() {
        let panel: Panel = serde_json::from_value(json!({
            "id": 4,
            "title": "Temps",
            "fieldConfig": {"defaults": {"min": "5", "max": "", "unit": "celsius"}}
        }))
        .unwrap();

        let defaults = &panel.field_config.defaults;
        assert_eq!(defaults.min, Some(5.0));
        assert_eq!(defaults.max, None);

        let back = serde_json::to_value(&panel).unwrap();
        assert_eq!(back["fieldConfig"]["defaults"], json!({"min": 5.0, "unit": "celsius"}));
    }

    #[test]
    fn test_unparseable_bound_is_kept_as_is() {
        let mut defaults: FieldDefaults =
            serde_json::from_value(json!({"min": "auto", "max": {"mode": "x"}})).unwrap();
        assert_eq!(defaults.min, None);
        assert_eq!(
            serde_json::to_value(&defaults).unwrap(),
            json!({"min": "auto", "max": {"mode": "x"}})
        );

        defaults.set_min(-1.0);
        assert_eq!(
            serde_json::to_value(&defaults).unwrap(),
            json!({"min": -1.0, "max": {"mode": "x"}})
        );
    }

    #[test]
    fn test_target_columns() {
        let target: Target = serde_json::from_value(json!({
            "refId": "A",
            "select": [[{"type": "column", "params": ["c01", "c02"]}]]
        }))
        .unwrap();
        assert_eq!(target.columns(), vec!["c01", "c02"]);

        let foreign: Target = serde_json::from_value(json!({"refId": "B", "expr": "up"})).unwrap();
        assert!(foreign.columns().is_empty());
    }

    #[test]
    fn test_panel_mut_first_match() {
        let mut dashboard: Dashboard = serde_json::from_value(json!({
            "title": "x",
            "panels": [{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]
        }))
        .unwrap();

        dashboard.panel_mut(2).unwrap().title = "changed".to_string();
        assert_eq!(dashboard.panels[1].title, "changed");
        assert!(dashboard.panel_mut(9).is_none());
    }

    #[test]
    fn test_org_serde() {
        assert_eq!(serde_json::to_value(Org::Temp).unwrap(), json!("temp"));
        let org: Org = serde_json::from_value(json!("main")).unwrap();
        assert_eq!(org, Org::Main);
    }
}

// Base documents new dashboards, panels and targets are stamped from
use super::dashboard::{Dashboard, FieldConfig, FieldDefaults, Panel, Target, TimeRange};
use serde_json::{json, Map, Value};

pub fn new_dashboard(title: &str) -> Dashboard {
    let mut extra = Map::new();
    extra.insert("timezone".to_string(), json!("browser"));
    extra.insert("version".to_string(), json!(0));

    Dashboard {
        id: None,
        uid: None,
        title: title.to_string(),
        tags: vec![String::new()],
        panels: Vec::new(),
        time: TimeRange::default(),
        schema_version: 0,
        refresh: json!("25s"),
        extra,
    }
}

/// Time-series line graph with no targets.
pub fn line_graph(id: i64, title: &str) -> Panel {
    let defaults = FieldDefaults {
        min: None,
        max: None,
        extra: object(json!({
            "color": {"mode": "palette-classic"},
            "custom": {
                "axisLabel": "",
                "axisPlacement": "auto",
                "barAlignment": 0,
                "drawStyle": "points",
                "fillOpacity": 0,
                "gradientMode": "none",
                "hideFrom": {"legend": false, "tooltip": false, "viz": false},
                "lineInterpolation": "linear",
                "lineWidth": 1,
                "pointSize": 5,
                "scaleDistribution": {"type": "linear"},
                "showPoints": "auto",
                "spanNulls": false,
                "stacking": {"group": "A", "mode": "none"},
                "thresholdsStyle": {"mode": "off"}
            },
            "mappings": [],
            "thresholds": {
                "mode": "absolute",
                "steps": [
                    {"color": "green", "value": null},
                    {"color": "red", "value": 80}
                ]
            }
        })),
    };

    Panel {
        id,
        title: title.to_string(),
        kind: "timeseries".to_string(),
        field_config: FieldConfig {
            defaults,
            extra: object(json!({"overrides": []})),
        },
        targets: Vec::new(),
        extra: object(json!({
            "datasource": null,
            "gridPos": {"h": 8, "w": 12},
            "options": {
                "legend": {"calcs": [], "displayMode": "list", "placement": "bottom"},
                "tooltip": {"mode": "single"}
            }
        })),
    }
}

/// Raw SQL time-series target over `table`, recording `columns` as its selection.
pub fn sql_target(ref_id: String, table: &str, columns: &[String], raw_sql: String) -> Target {
    Target {
        ref_id,
        raw_sql,
        table: table.to_string(),
        select: json!([[{"params": columns, "type": "column"}]]),
        extra: object(json!({
            "format": "time_series",
            "group": [],
            "metricColumn": "none",
            "rawQuery": true,
            "timeColumn": "time",
            "where": []
        })),
    }
}

/// Grafana-style query ref ids: A..Z, then AA, AB, ...
pub fn ref_id(index: usize) -> String {
    let mut n = index;
    let mut id = Vec::new();
    loop {
        id.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    id.reverse();
    String::from_utf8_lossy(&id).into_owned()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

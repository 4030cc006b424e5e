//! Chart.js configuration output.

use diagchart_types::Tick;
use serde_json::{json, Map, Value};

use super::{check_shape, ChartRenderer};
use crate::chart::{AxisId, AxisOptions, ChartConfig, ChartType, Dataset};
use crate::error::RenderError;

/// Renders charts as Chart.js configuration objects.
///
/// Timelines have no Chart.js counterpart and are emitted as scatter charts
/// whose points keep their state, event and detail fields.
#[derive(Debug, Clone, Default)]
pub struct ChartJsRenderer;

impl ChartJsRenderer {
    pub fn new() -> Self {
        Self
    }

    fn dataset(&self, chart: &ChartConfig, dataset: &Dataset) -> Result<Value, RenderError> {
        let mut out = Map::new();
        out.insert("label".to_string(), json!(dataset.label));
        out.insert("data".to_string(), serde_json::to_value(&dataset.data)?);

        if let Some(chart_type) = dataset.chart_type.filter(|t| *t != chart.chart_type) {
            out.insert("type".to_string(), json!(chart_js_type(chart_type)));
        }
        if dataset.colors.is_empty() {
            out.insert("backgroundColor".to_string(), json!(dataset.color));
            out.insert("borderColor".to_string(), json!(dataset.color.with_alpha(1.0)));
        } else {
            out.insert("backgroundColor".to_string(), serde_json::to_value(&dataset.colors)?);
        }
        if let Some(stack) = &dataset.stack {
            out.insert("stack".to_string(), json!(stack));
        }
        if chart.chart_type != ChartType::Pie {
            let axis = match (dataset.axis, chart.options.horizontal) {
                (AxisId::Primary, false) => "y",
                (AxisId::Primary, true) => "x",
                (AxisId::Secondary, false) => "y1",
                (AxisId::Secondary, true) => "x1",
            };
            let key = if chart.options.horizontal { "xAxisID" } else { "yAxisID" };
            out.insert(key.to_string(), json!(axis));
        }
        for companion in &dataset.companions {
            out.insert(companion_key(&companion.name), json!(companion.values));
        }
        Ok(Value::Object(out))
    }

    fn scales(&self, chart: &ChartConfig) -> Value {
        let options = &chart.options;
        let mut scales = Map::new();
        let mut x = scale(&options.x);
        if options.time_axis {
            x.insert("type".to_string(), json!("time"));
        }
        scales.insert("x".to_string(), Value::Object(x));
        scales.insert("y".to_string(), Value::Object(scale(&options.y)));
        if let Some(y2) = &options.y2 {
            let mut secondary = scale(y2);
            secondary.insert("position".to_string(), json!("right"));
            secondary.insert("grid".to_string(), json!({ "drawOnChartArea": false }));
            let key = if options.horizontal { "x1" } else { "y1" };
            scales.insert(key.to_string(), Value::Object(secondary));
        }
        Value::Object(scales)
    }
}

impl ChartRenderer for ChartJsRenderer {
    type Output = Value;

    fn render(&mut self, chart: &ChartConfig) -> Result<Value, RenderError> {
        check_shape(chart)?;

        let datasets = chart
            .datasets
            .iter()
            .map(|d| self.dataset(chart, d))
            .collect::<Result<Vec<_>, _>>()?;
        let labels: Vec<Value> = chart.labels.iter().map(label).collect();

        let mut plugins = Map::new();
        plugins.insert("title".to_string(), json!({ "display": true, "text": chart.title }));
        plugins.insert(
            "legend".to_string(),
            json!({
                "display": chart.options.legend.display,
                "position": chart.options.legend.position,
            }),
        );
        if chart.options.zoomable {
            plugins.insert(
                "zoom".to_string(),
                json!({
                    "zoom": { "wheel": { "enabled": true }, "pinch": { "enabled": true }, "mode": "x" },
                    "pan": { "enabled": true, "mode": "x" },
                }),
            );
        }
        if !chart.categories.is_empty() {
            let categories: Vec<Value> = chart
                .categories
                .iter()
                .map(|c| json!({ "label": c.label, "color": c.color }))
                .collect();
            plugins.insert("categories".to_string(), Value::Array(categories));
        }

        let mut options = Map::new();
        options.insert("responsive".to_string(), json!(true));
        options.insert("plugins".to_string(), Value::Object(plugins));
        if chart.chart_type != ChartType::Pie {
            options.insert("scales".to_string(), self.scales(chart));
        }
        if chart.options.horizontal {
            options.insert("indexAxis".to_string(), json!("y"));
        }

        tracing::debug!(chart = %chart.id, datasets = datasets.len(), "rendered chart.js config");
        Ok(json!({
            "type": chart_js_type(chart.chart_type),
            "data": { "labels": labels, "datasets": datasets },
            "options": options,
        }))
    }
}

fn chart_js_type(chart_type: ChartType) -> &'static str {
    match chart_type {
        ChartType::Timeline => "scatter",
        other => other.name(),
    }
}

fn label(tick: &Tick) -> Value {
    match tick {
        Tick::Millis(ms) => json!(ms),
        Tick::Label(s) => json!(s),
    }
}

fn scale(axis: &AxisOptions) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(title) = &axis.title {
        out.insert("title".to_string(), json!({ "display": true, "text": title }));
    }
    if axis.stacked {
        out.insert("stacked".to_string(), json!(true));
    }
    if axis.begin_at_zero {
        out.insert("beginAtZero".to_string(), json!(true));
    }
    if let Some(min) = axis.min {
        out.insert("min".to_string(), json!(min));
    }
    if let Some(max) = axis.max {
        out.insert("max".to_string(), json!(max));
    }
    if !axis.tick_labels.is_empty() {
        out.insert("labels".to_string(), json!(axis.tick_labels));
        out.insert("ticks".to_string(), json!({ "stepSize": 1 }));
    }
    out
}

/// Property name of a companion series, e.g. "Cache Size" -> "cacheSizeData".
fn companion_key(name: &str) -> String {
    let mut key = String::new();
    for (i, word) in name.split_whitespace().enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                key.extend(first.to_lowercase());
            } else {
                key.extend(first.to_uppercase());
            }
            key.push_str(chars.as_str());
        }
    }
    key.push_str("Data");
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AxisOptions, ChartType, Color, Dataset};
    use crate::report::{Report, ReportOptions};
    use diagchart_types::Record;

    fn mixed_chart() -> ChartConfig {
        ChartConfig::new("rate", "Rate", ChartType::Bar)
            .labels(vec![Tick::Millis(0), Tick::Millis(60_000)])
            .dataset(
                Dataset::values("Count", vec![1.0, 2.0])
                    .color(Color::rgba(54, 162, 235, 0.5))
                    .stack("s"),
            )
            .dataset(
                Dataset::values("Total", vec![10.0, 20.0])
                    .chart_type(ChartType::Line)
                    .axis(AxisId::Secondary)
                    .companion("Cache Size", vec![4.0, 4.0]),
            )
            .y_axis(AxisOptions::titled("Count").stacked())
            .y2_axis(AxisOptions::titled("Total"))
            .time_axis()
            .zoomable()
    }

    #[test]
    fn test_chart_js_shape() {
        let out = ChartJsRenderer::new().render(&mixed_chart()).unwrap();

        assert_eq!(out["type"], "bar");
        assert_eq!(out["data"]["labels"], json!([0, 60_000]));
        let count = &out["data"]["datasets"][0];
        assert_eq!(count["data"], json!([1.0, 2.0]));
        assert_eq!(count["backgroundColor"], "rgba(54, 162, 235, 0.5)");
        assert_eq!(count["borderColor"], "rgb(54, 162, 235)");
        assert_eq!(count["stack"], "s");
        assert_eq!(count["yAxisID"], "y");
        assert!(count.get("type").is_none());

        let total = &out["data"]["datasets"][1];
        assert_eq!(total["type"], "line");
        assert_eq!(total["yAxisID"], "y1");
        assert_eq!(total["cacheSizeData"], json!([4.0, 4.0]));

        let options = &out["options"];
        assert_eq!(options["plugins"]["title"]["text"], "Rate");
        assert_eq!(options["plugins"]["legend"]["position"], "top");
        assert_eq!(options["plugins"]["zoom"]["pan"]["mode"], "x");
        assert_eq!(options["scales"]["x"]["type"], "time");
        assert_eq!(options["scales"]["y"]["stacked"], true);
        assert_eq!(options["scales"]["y1"]["position"], "right");
        assert!(options.get("indexAxis").is_none());
    }

    #[test]
    fn test_pie_has_no_scales() {
        let records = vec![Record::builder().field("_key", "7.0.4").field("value", 2).build()];
        let charts = Report::VersionDistribution.build(&records, &ReportOptions::default());
        let out = ChartJsRenderer::new().render(&charts[0]).unwrap();

        assert_eq!(out["type"], "pie");
        assert!(out["options"].get("scales").is_none());
        assert!(out["data"]["datasets"][0]["backgroundColor"].is_array());
        assert!(out["data"]["datasets"][0].get("yAxisID").is_none());
    }

    #[test]
    fn test_horizontal_and_timeline() {
        let chart = ChartConfig::new("frag", "Frag", ChartType::Bar)
            .labels(vec![Tick::label("app.users")])
            .dataset(Dataset::values("shard0", vec![25.0]))
            .horizontal()
            .x_axis(AxisOptions::titled("%").range(None, Some(100.0)));
        let out = ChartJsRenderer::new().render(&chart).unwrap();
        assert_eq!(out["options"]["indexAxis"], "y");
        assert_eq!(out["options"]["scales"]["x"]["max"], 100.0);
        assert_eq!(out["data"]["datasets"][0]["xAxisID"], "x");

        let timeline = ChartConfig::new("t", "T", ChartType::Timeline)
            .y_axis(AxisOptions::titled("Members").tick_labels(vec!["a".into()]))
            .category("PRIMARY", Color::rgb(0, 255, 0));
        let out = ChartJsRenderer::new().render(&timeline).unwrap();
        assert_eq!(out["type"], "scatter");
        assert_eq!(out["options"]["scales"]["y"]["labels"], json!(["a"]));
        assert_eq!(out["options"]["plugins"]["categories"][0]["color"], "rgb(0, 255, 0)");
    }

    #[test]
    fn test_misaligned_dataset_is_rejected() {
        let chart = ChartConfig::new("c", "C", ChartType::Line).dataset(Dataset::values("x", vec![1.0]));
        assert!(matches!(
            ChartJsRenderer::new().render(&chart),
            Err(RenderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_companion_key() {
        assert_eq!(companion_key("Available"), "availableData");
        assert_eq!(companion_key("Cache Size"), "cacheSizeData");
    }
}

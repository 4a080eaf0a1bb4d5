use crate::{
    config::OutputConfig,
    error::{Result, TechSignalError},
    types::{columns, RowSignals, SignalFamily},
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const FIBONACCI_RATIOS: [f64; 4] = [0.236, 0.382, 0.5, 0.618];

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const PANEL_SPACING: f64 = 0.02;
const VOLUME_AXIS: usize = 12;

const RED: &str = "#E74C3C";
const GREEN: &str = "#27AE60";
const GREY: &str = "#2C3E50";

/// Panels from top to bottom with their relative heights
const PANELS: [(&str, f64); 11] = [
    ("Price and moving averages", 2.0),
    ("MACD", 1.0),
    ("RSI", 1.0),
    ("Bollinger Bands", 1.0),
    ("ATR and VIX", 1.0),
    ("Stochastic", 1.0),
    ("Momentum", 1.0),
    ("CRSI", 1.0),
    ("Fibonacci levels", 1.0),
    ("Indices", 1.0),
    ("Signals", 1.0),
];

// --- Figure model (Plotly JSON schema subset) ---

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub xaxis: String,
    pub yaxis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Fixed(String),
    Scores(Vec<i8>),
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub color: MarkerColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Vec<(f64, &'static str)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Text,
    pub height: u32,
    pub showlegend: bool,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub annotations: Vec<Annotation>,
    /// `xaxis`, `yaxis2`, ...
    #[serde(flatten)]
    pub axes: BTreeMap<String, Axis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
    pub yanchor: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
}

impl Figure {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Standalone page that loads Plotly from its CDN.
    pub fn to_html(&self) -> Result<String> {
        // `</script>` inside a string would otherwise end the inline script.
        let figure = serde_json::to_string(self)?.replace('<', "\\u003c");
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <script src=\"{cdn}\"></script>\n</head>\n<body>\n<div id=\"chart\"></div>\n\
             <script>\nconst figure = {figure};\nPlotly.newPlot('chart', figure.data, figure.layout);\n</script>\n\
             </body>\n</html>\n",
            title = escape_html(&self.layout.title.text),
            cdn = PLOTLY_CDN,
            figure = figure,
        ))
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_html()?)?;
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `(ratio, price)` retracement levels measured down from `max_high`.
pub fn fibonacci_levels(max_high: f64, min_low: f64) -> [(f64, f64); 4] {
    let diff = max_high - min_low;
    FIBONACCI_RATIOS.map(|ratio| (ratio, max_high - ratio * diff))
}

fn axis_ref(prefix: &str, number: usize) -> String {
    if number == 1 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, number)
    }
}

fn axis_key(prefix: &str, number: usize) -> String {
    if number == 1 {
        format!("{}axis", prefix)
    } else {
        format!("{}axis{}", prefix, number)
    }
}

/// Vertical `[bottom, top]` domain of each panel.
fn panel_domains() -> Vec<[f64; 2]> {
    let total_weight: f64 = PANELS.iter().map(|(_, w)| w).sum();
    let usable = 1.0 - PANEL_SPACING * (PANELS.len() - 1) as f64;
    let unit = usable / total_weight;

    let mut top = 1.0;
    PANELS
        .iter()
        .map(|(_, weight)| {
            let bottom = (top - weight * unit).max(0.0);
            let domain = [bottom, top];
            top = bottom - PANEL_SPACING;
            domain
        })
        .collect()
}

pub struct ChartBuilder {
    height: u32,
}

impl ChartBuilder {
    pub fn new(height: u32) -> Self {
        Self { height }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.chart_height)
    }

    /// Eleven stacked panels over the table's dates; `signals` must align with its rows.
    pub fn build(&self, table: &DataFrame, signals: &[RowSignals], ticker: &str) -> Result<Figure> {
        if signals.len() != table.height() {
            return Err(TechSignalError::Chart(format!(
                "{} signal rows for {} table rows",
                signals.len(),
                table.height()
            )));
        }

        let dates = Self::dates(table)?;
        let mut panel = PanelWriter {
            table,
            dates: &dates,
            traces: Vec::new(),
        };

        // 1: price
        panel.line(1, columns::CLOSE, "Price", "#2C3E50", None)?;
        panel.line(1, columns::SMA20, "SMA20", "#F39C12", None)?;
        panel.line(1, columns::SMA50, "SMA50", "#8E44AD", None)?;
        panel.line(1, columns::VWAP, "VWAP", "#16A085", Some("dot"))?;
        let volume = panel.values(columns::VOLUME)?;
        panel.traces.push(Trace {
            kind: TraceKind::Bar,
            name: "Volume".to_string(),
            x: dates.clone(),
            y: volume,
            xaxis: axis_ref("x", 1),
            yaxis: axis_ref("y", VOLUME_AXIS),
            mode: None,
            line: None,
            marker: Some(Marker {
                size: None,
                color: MarkerColor::Fixed("#95A5A6".to_string()),
                colorscale: None,
                cmin: None,
                cmax: None,
            }),
            opacity: Some(0.3),
        });

        // 2: MACD
        panel.line(2, columns::MACD, "MACD", "#2E86C1", None)?;
        panel.line(2, columns::MACD_SIGNAL, "MACD Signal", "#F39C12", None)?;

        // 3: RSI
        panel.line(3, columns::RSI, "RSI", "#2C3E50", None)?;
        panel.guide(3, 70.0, "RSI 70", RED);
        panel.guide(3, 30.0, "RSI 30", GREEN);

        // 4: Bollinger
        panel.line(4, columns::CLOSE, "Price", "#2C3E50", None)?;
        panel.line(4, columns::BB_UPPER, "BB Upper", "#7F8C8D", Some("dash"))?;
        panel.line(4, columns::BB_MIDDLE, "BB Middle", "#7F8C8D", None)?;
        panel.line(4, columns::BB_LOWER, "BB Lower", "#7F8C8D", Some("dash"))?;

        // 5: volatility
        panel.line(5, columns::ATR, "ATR", "#2C3E50", None)?;
        panel.line(5, columns::VIX, "VIX", RED, None)?;

        // 6: stochastic
        panel.line(6, columns::STOCH_K, "Stoch K", "#2E86C1", None)?;
        panel.line(6, columns::STOCH_D, "Stoch D", "#F39C12", None)?;
        panel.guide(6, 80.0, "Stoch 80", RED);
        panel.guide(6, 20.0, "Stoch 20", GREEN);

        // 7: momentum
        panel.line(7, columns::MOMENTUM, "Momentum", "#2C3E50", None)?;
        panel.guide(7, 0.0, "Momentum 0", GREY);

        // 8: CRSI
        panel.line(8, columns::CRSI, "CRSI", "#2C3E50", None)?;
        panel.guide(8, 70.0, "CRSI 70", RED);
        panel.guide(8, 30.0, "CRSI 30", GREEN);

        // 9: Fibonacci
        panel.line(9, columns::CLOSE, "Price", "#2C3E50", None)?;
        let max_high = table.column(columns::HIGH)?.cast(&DataType::Float64)?.f64()?.max();
        let min_low = table.column(columns::LOW)?.cast(&DataType::Float64)?.f64()?.min();
        match (max_high, min_low) {
            (Some(high), Some(low)) => {
                let fib_colors = [RED, "#F39C12", "#F1C40F", GREEN];
                for ((ratio, level), color) in fibonacci_levels(high, low).into_iter().zip(fib_colors) {
                    panel.guide(9, level, &format!("Fib {:.1}%", ratio * 100.0), color);
                }
            }
            _ => log::warn!("No High/Low values, Fibonacci levels skipped"),
        }

        // 10: indices
        panel.line(10, columns::SP500, "S&P 500", GREEN, None)?;
        panel.line(10, columns::NASDAQ, "NASDAQ", RED, None)?;
        panel.line(10, columns::DOW, "Dow Jones", "#3498DB", None)?;

        // 11: signal markers
        for family in SignalFamily::ALL {
            let scores: Vec<i8> = signals
                .iter()
                .map(|row| row.signals().map_or(0, |set| set.get(family).score()))
                .collect();
            let y_pos = family.index() as f64 / SignalFamily::COUNT as f64;
            panel.traces.push(Trace {
                kind: TraceKind::Scatter,
                name: family.name().to_string(),
                x: dates.clone(),
                y: vec![Some(y_pos); dates.len()],
                xaxis: axis_ref("x", 11),
                yaxis: axis_ref("y", 11),
                mode: Some("markers"),
                line: None,
                marker: Some(Marker {
                    size: Some(8),
                    color: MarkerColor::Scores(scores),
                    colorscale: Some(vec![(0.0, RED), (0.5, "#F4D03F"), (1.0, GREEN)]),
                    cmin: Some(-1.0),
                    cmax: Some(1.0),
                }),
                opacity: None,
            });
        }

        let traces = panel.traces;
        log::debug!("Chart for {} has {} traces", ticker, traces.len());

        Ok(Figure {
            data: traces,
            layout: self.layout(ticker),
        })
    }

    fn layout(&self, ticker: &str) -> Layout {
        let domains = panel_domains();
        let mut axes = BTreeMap::new();
        let mut annotations = Vec::new();

        for (i, ((title, _), domain)) in PANELS.iter().zip(domains.iter()).enumerate() {
            let number = i + 1;
            let last = number == PANELS.len();
            axes.insert(
                axis_key("x", number),
                Axis {
                    anchor: Some(axis_ref("y", number)),
                    matches: (number > 1).then(|| "x".to_string()),
                    showticklabels: Some(last),
                    ..Default::default()
                },
            );
            axes.insert(
                axis_key("y", number),
                Axis {
                    domain: Some(*domain),
                    anchor: Some(axis_ref("x", number)),
                    ..Default::default()
                },
            );
            annotations.push(Annotation {
                text: title.to_string(),
                xref: "paper",
                yref: "paper",
                x: 0.5,
                y: domain[1],
                showarrow: false,
                yanchor: "bottom",
            });
        }

        axes.insert(
            axis_key("y", VOLUME_AXIS),
            Axis {
                anchor: Some(axis_ref("x", 1)),
                overlaying: Some(axis_ref("y", 1)),
                side: Some("right"),
                ..Default::default()
            },
        );

        Layout {
            title: Text {
                text: format!("Technical analysis for {}", ticker),
            },
            height: self.height,
            showlegend: true,
            plot_bgcolor: "rgb(230, 230, 255)",
            paper_bgcolor: "white",
            annotations,
            axes,
        }
    }

    fn dates(table: &DataFrame) -> Result<Vec<String>> {
        let dates = table.column(columns::DATE).map_err(|_| TechSignalError::MissingColumn {
            column: columns::DATE.to_string(),
        })?;
        let dates = dates.cast(&DataType::String)?;
        Ok(dates
            .str()?
            .into_iter()
            .map(|d| d.unwrap_or_default().to_string())
            .collect())
    }
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self::from_config(&OutputConfig::default())
    }
}

struct PanelWriter<'a> {
    table: &'a DataFrame,
    dates: &'a [String],
    traces: Vec<Trace>,
}

impl PanelWriter<'_> {
    fn values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.table.column(name).map_err(|_| TechSignalError::MissingColumn {
            column: name.to_string(),
        })?;
        let column = column.cast(&DataType::Float64)?;
        Ok(column
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect())
    }

    fn line(
        &mut self,
        panel: usize,
        column: &str,
        name: &str,
        color: &str,
        dash: Option<&'static str>,
    ) -> Result<()> {
        let y = self.values(column)?;
        self.push_line(panel, name, y, color, dash);
        Ok(())
    }

    /// Horizontal reference line across the whole date range.
    fn guide(&mut self, panel: usize, level: f64, name: &str, color: &str) {
        let y = vec![Some(level); self.dates.len()];
        self.push_line(panel, name, y, color, Some("dash"));
    }

    fn push_line(
        &mut self,
        panel: usize,
        name: &str,
        y: Vec<Option<f64>>,
        color: &str,
        dash: Option<&'static str>,
    ) {
        self.traces.push(Trace {
            kind: TraceKind::Scatter,
            name: name.to_string(),
            x: self.dates.to_vec(),
            y,
            xaxis: axis_ref("x", panel),
            yaxis: axis_ref("y", panel),
            mode: Some("lines"),
            line: Some(Line {
                color: color.to_string(),
                dash,
            }),
            marker: None,
            opacity: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_levels() {
        let levels = fibonacci_levels(200.0, 100.0);
        assert_eq!(levels[0].0, 0.236);
        assert!((levels[0].1 - 176.4).abs() < 1e-9);
        assert!((levels[2].1 - 150.0).abs() < 1e-9);
        assert!((levels[3].1 - 138.2).abs() < 1e-9);
    }

    #[test]
    fn test_panel_domains_are_stacked() {
        let domains = panel_domains();
        assert_eq!(domains.len(), 11);
        assert!((domains[0][1] - 1.0).abs() < 1e-12);
        assert!(domains[10][0] >= 0.0 && domains[10][0] < 1e-9);
        for pair in domains.windows(2) {
            assert!(pair[1][1] < pair[0][0]);
        }
        // Price panel is twice as tall as the others
        let height = |d: [f64; 2]| d[1] - d[0];
        assert!((height(domains[0]) - 2.0 * height(domains[1])).abs() < 1e-9);
    }

    #[test]
    fn test_axis_naming() {
        assert_eq!(axis_ref("y", 1), "y");
        assert_eq!(axis_ref("y", 3), "y3");
        assert_eq!(axis_key("x", 1), "xaxis");
        assert_eq!(axis_key("y", 12), "yaxis12");
    }

    #[test]
    fn test_html_escapes_title_and_inline_json() {
        let figure = Figure {
            data: vec![],
            layout: Layout {
                title: Text {
                    text: "Technical analysis for </script><b>\"A&B\"".to_string(),
                },
                height: 600,
                showlegend: true,
                plot_bgcolor: "white",
                paper_bgcolor: "white",
                annotations: vec![],
                axes: BTreeMap::new(),
            },
        };

        let html = figure.to_html().unwrap();
        assert!(html.contains(
            "<title>Technical analysis for &lt;/script&gt;&lt;b&gt;&quot;A&amp;B&quot;</title>"
        ));
        assert!(html.contains("\\u003c/script>\\u003cb>"));
        assert_eq!(html.matches("</script>").count(), 2);

        // The escaped form is still the same JSON string.
        let start = html.find("const figure = ").unwrap() + "const figure = ".len();
        let end = html[start..].find(";\n").unwrap() + start;
        let parsed: serde_json::Value = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(parsed["layout"]["title"]["text"], figure.layout.title.text.as_str());
    }
}

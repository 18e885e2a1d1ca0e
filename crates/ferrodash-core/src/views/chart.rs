//! Renderer-agnostic chart descriptions.
//!
//! The shape follows the Plotly figure JSON (`{data, layout}`) so a browser
//! surface can pass a serialized [`ChartSpec`] straight to its charting library.

use serde::Serialize;

const TICK_FONT_SIZE: u32 = 10;

/// Trace data plus layout metadata for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        &self.layout.title.text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<u64>,
        marker: Marker,
    },
    Heatmap {
        z: Vec<Vec<Option<f64>>>,
        x: Vec<String>,
        y: Vec<String>,
        colorscale: String,
        zmin: f64,
        zmax: f64,
    },
}

impl Trace {
    /// Number of x positions carried by the trace.
    pub fn len(&self) -> usize {
        match self {
            Self::Candlestick { x, .. } | Self::Bar { x, .. } | Self::Heatmap { x, .. } => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub showlegend: bool,
}

impl Layout {
    /// Centered title, no legend, small tick labels on both axes.
    pub fn centered(title: impl Into<String>, xaxis: Axis, yaxis: Axis) -> Self {
        Self {
            title: Title {
                text: title.into(),
                x: 0.5,
            },
            xaxis,
            yaxis,
            showlegend: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickFont {
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    pub tickfont: TickFont,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nticks: Option<u32>,
}

impl Axis {
    /// Axis without an explicit `type`; the renderer infers it from the data.
    pub fn plain(title: impl Into<String>) -> Self {
        Self {
            title: AxisTitle { text: title.into() },
            axis_type: None,
            tickfont: TickFont {
                size: TICK_FONT_SIZE,
            },
            nticks: None,
        }
    }

    pub fn date(title: impl Into<String>) -> Self {
        Self {
            axis_type: Some(String::from("date")),
            nticks: Some(10),
            ..Self::plain(title)
        }
    }
}

//! Chart Plotter Module
//! Builds renderer-agnostic chart specifications for each dashboard visual.

use crate::config::MetricsConfig;
use crate::data::{BoundarySet, YearPair};
use crate::stats::{EventStudyPoint, KpiSummary, RankedGrowth};
use serde::Serialize;
use std::collections::HashSet;

/// Accent color, also the higher-dynamism group color
pub const NAVY: &str = "#1e3a8a";
/// Muted color, also the lower-dynamism group color
pub const SLATE: &str = "#94a3b8";
pub const LIGHT_SLATE: &str = "#cbd5e1";
pub const ALERT_RED: &str = "#ef4444";
pub const GUIDE_GRAY: &str = "gray";

/// Diverging scale for the expansion map: losses red, gains blue.
pub const EXPANSION_SCALE: [(f64, &str); 3] = [
    (0.0, "rgb(202,0,32)"),
    (0.5, "rgb(247,247,247)"),
    (1.0, "rgb(5,113,176)"),
];

/// A point coordinate: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Bar,
    Line,
    Markers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dash {
    Dot,
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub dash: Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub orientation: Orientation,
    pub x: Vec<AxisValue>,
    pub y: Vec<AxisValue>,
    /// Per-point labels (hover names or bar text).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    /// One color per point, or a single color for the whole trace.
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_template: Option<String>,
}

/// A reference segment drawn over the plot area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub height: u32,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub traces: Vec<Trace>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

/// Choropleth over the boundary features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub title: String,
    pub height: u32,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    pub text: Vec<String>,
    pub colorscale: Vec<(f64, String)>,
    pub colorbar_title: String,
    pub hover_template: String,
    /// Only the features that match a location.
    pub geojson: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Creates the chart specifications.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color of an income-group label; unknown labels fall back to light slate.
    pub fn get_group_color(group: &str, config: &MetricsConfig) -> &'static str {
        if group == config.higher_group {
            NAVY
        } else if group == config.lower_group {
            SLATE
        } else {
            LIGHT_SLATE
        }
    }

    /// The three headline cards.
    pub fn kpi_cards(kpi: &KpiSummary, impact_headline: &str) -> Vec<KpiCard> {
        let mean = kpi
            .mean_coverage
            .map(|m| format!("{:.1}%", m))
            .unwrap_or_else(|| "—".to_string());

        vec![
            KpiCard {
                label: "Cobertura Média".to_string(),
                value: mean,
                color: None,
            },
            KpiCard {
                label: "Abaixo da Meta".to_string(),
                value: kpi.below_target.to_string(),
                color: Some(ALERT_RED.to_string()),
            },
            KpiCard {
                label: "Diferencial de Impacto".to_string(),
                value: impact_headline.to_string(),
                color: None,
            },
        ]
    }

    /// Expansion choropleth. Boundaries that match no joined municipality are dropped.
    pub fn expansion_map(pair: &YearPair, boundaries: &BoundarySet) -> MapSpec {
        let rows = pair.rows();
        let keys: HashSet<&str> = rows.iter().map(|r| r.municipality_id.as_str()).collect();

        MapSpec {
            title: "Expansão (Mapa)".to_string(),
            height: 400,
            locations: rows.iter().map(|r| r.municipality_id.clone()).collect(),
            z: rows.iter().map(|r| r.expansion()).collect(),
            text: rows.iter().map(|r| r.name.clone()).collect(),
            colorscale: EXPANSION_SCALE
                .iter()
                .map(|(stop, color)| (*stop, color.to_string()))
                .collect(),
            colorbar_title: "pp".to_string(),
            hover_template: "<b>%{text}</b><br>Expansão: %{z:.1f} pp<extra></extra>".to_string(),
            geojson: boundaries.feature_collection_for(&keys),
        }
    }

    /// Bars of the normalized gap with a dotted trend line and a marker at the origin.
    pub fn event_study_chart(points: &[EventStudyPoint], origin_year: i32) -> ChartSpec {
        let x: Vec<AxisValue> = points
            .iter()
            .map(|p| AxisValue::Number(p.year as f64))
            .collect();
        let y: Vec<AxisValue> = points
            .iter()
            .map(|p| AxisValue::Number(p.normalized_gap))
            .collect();
        let colors = points
            .iter()
            .map(|p| {
                if p.year <= origin_year {
                    SLATE.to_string()
                } else {
                    NAVY.to_string()
                }
            })
            .collect();

        let bars = Trace {
            name: "Diferencial".to_string(),
            kind: TraceKind::Bar,
            orientation: Orientation::Vertical,
            x: x.clone(),
            y: y.clone(),
            text: Vec::new(),
            colors,
            line: None,
            hover_template: Some("<b>%{x}</b><br>Gap: %{y:.3f}<extra></extra>".to_string()),
        };

        let trend = Trace {
            name: "Tendência".to_string(),
            kind: TraceKind::Line,
            orientation: Orientation::Vertical,
            x,
            y,
            text: Vec::new(),
            colors: vec![GUIDE_GRAY.to_string()],
            line: Some(LineStyle {
                color: GUIDE_GRAY.to_string(),
                width: 2.0,
                dash: Dash::Dot,
            }),
            hover_template: None,
        };

        ChartSpec {
            title: "Event Study: Abertura do Gap".to_string(),
            height: 350,
            x_label: None,
            y_label: None,
            traces: vec![bars, trend],
            shapes: vec![Shape {
                x0: origin_year as f64,
                x1: origin_year as f64,
                y0: -0.2,
                y1: 0.2,
                line: LineStyle {
                    color: GUIDE_GRAY.to_string(),
                    width: 1.0,
                    dash: Dash::Dash,
                },
            }],
        }
    }

    /// Expansion vs female population growth, one trace per income group.
    ///
    /// Municipalities with undefined growth are left out.
    pub fn scatter_chart(pair: &YearPair, config: &MetricsConfig) -> ChartSpec {
        let mut groups: Vec<&str> = pair
            .rows()
            .iter()
            .map(|r| r.income_group.as_str())
            .collect();
        groups.sort_unstable();
        groups.dedup();

        let traces = groups
            .into_iter()
            .map(|group| {
                let mut x = Vec::new();
                let mut y = Vec::new();
                let mut text = Vec::new();

                for row in pair.rows().iter().filter(|r| r.income_group == group) {
                    if let Some(growth) = row.growth_pct() {
                        x.push(AxisValue::Number(row.expansion()));
                        y.push(AxisValue::Number(growth));
                        text.push(row.name.clone());
                    }
                }

                Trace {
                    name: group.to_string(),
                    kind: TraceKind::Markers,
                    orientation: Orientation::Vertical,
                    x,
                    y,
                    text,
                    colors: vec![Self::get_group_color(group, config).to_string()],
                    line: None,
                    hover_template: None,
                }
            })
            .collect();

        ChartSpec {
            title: "Expansão vs Emprego".to_string(),
            height: 400,
            x_label: Some("Expansão (pp)".to_string()),
            y_label: Some("Crescimento (%)".to_string()),
            traces,
            shapes: Vec::new(),
        }
    }

    /// Horizontal bars of the top growth municipalities, already in display order.
    pub fn top_growth_chart(ranked: &[RankedGrowth], highlight: Option<&str>) -> ChartSpec {
        let bars = Trace {
            name: "Crescimento".to_string(),
            kind: TraceKind::Bar,
            orientation: Orientation::Horizontal,
            x: ranked
                .iter()
                .map(|r| AxisValue::Number(r.growth))
                .collect(),
            y: ranked
                .iter()
                .map(|r| AxisValue::Label(r.name.clone()))
                .collect(),
            text: ranked.iter().map(|r| format!("{:.1}%", r.growth)).collect(),
            colors: ranked
                .iter()
                .map(|r| {
                    if Some(r.name.as_str()) == highlight {
                        NAVY.to_string()
                    } else {
                        LIGHT_SLATE.to_string()
                    }
                })
                .collect(),
            line: None,
            hover_template: None,
        };

        ChartSpec {
            title: format!("Top {} Performers", ranked.len()),
            height: 400,
            x_label: None,
            y_label: None,
            traces: vec![bars],
            shapes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BoundaryLoader, DataProcessor, MunicipalYearRecord, Panel};

    const HIGHER: &str = "Maior Dinamismo Econômico";
    const LOWER: &str = "Menor Dinamismo Econômico";

    fn record(id: &str, name: &str, year: i32, group: &str, coverage: f64, women: f64) -> MunicipalYearRecord {
        MunicipalYearRecord {
            municipality_id: id.to_string(),
            name: name.to_string(),
            year,
            income_group: group.to_string(),
            coverage,
            female_population: women,
            log_female_employment: 0.0,
        }
    }

    fn sample_pair() -> YearPair {
        let panel = Panel::new(vec![
            record("230010", "Abaiara", 2007, LOWER, 30.0, 1000.0),
            record("230010", "Abaiara", 2019, LOWER, 45.0, 1200.0),
            record("231140", "Quixeramobim", 2007, HIGHER, 20.0, 2000.0),
            record("231140", "Quixeramobim", 2019, HIGHER, 60.0, 3000.0),
            record("230020", "Acarape", 2007, HIGHER, 10.0, 0.0),
            record("230020", "Acarape", 2019, HIGHER, 12.0, 40.0),
        ]);
        DataProcessor::join_years(&panel, 2007, 2019)
    }

    #[test]
    fn test_kpi_cards_format() {
        let kpi = KpiSummary {
            year: 2019,
            mean_coverage: Some(48.26),
            below_target: 101,
        };
        let cards = ChartPlotter::kpi_cards(&kpi, "+42.5%");
        assert_eq!(cards[0].value, "48.3%");
        assert_eq!(cards[1].value, "101");
        assert_eq!(cards[1].color.as_deref(), Some(ALERT_RED));
        assert_eq!(cards[2].value, "+42.5%");
    }

    #[test]
    fn test_kpi_cards_undefined_mean() {
        let kpi = KpiSummary {
            year: 2019,
            mean_coverage: None,
            below_target: 0,
        };
        assert_eq!(ChartPlotter::kpi_cards(&kpi, "")[0].value, "—");
    }

    #[test]
    fn test_expansion_map_matches_boundaries() {
        let boundaries = BoundaryLoader::parse_boundaries(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"id": "2300101"}, "geometry": null},
                {"type": "Feature", "properties": {"id": "2399999"}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]}"#,
        )
        .unwrap();

        let map = ChartPlotter::expansion_map(&sample_pair(), &boundaries);
        assert_eq!(map.locations, vec!["230010", "230020", "231140"]);
        assert_eq!(map.z, vec![15.0, 2.0, 40.0]);
        assert_eq!(map.text[2], "Quixeramobim");

        let features = map.geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["id"], "230010");
    }

    #[test]
    fn test_event_study_chart_colors_split_at_origin() {
        let point = |year: i32, normalized_gap: f64| EventStudyPoint {
            year,
            higher_mean: 0.0,
            lower_mean: 0.0,
            gap: normalized_gap,
            normalized_gap,
        };
        let chart = ChartPlotter::event_study_chart(
            &[point(2011, -0.1), point(2012, 0.0), point(2013, 0.05)],
            2012,
        );

        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[0].colors, vec![SLATE, SLATE, NAVY]);
        assert_eq!(chart.traces[1].line.as_ref().map(|l| l.dash), Some(Dash::Dot));
        assert_eq!(chart.shapes[0].x0, 2012.0);
        assert_eq!(chart.traces[0].y[1], AxisValue::Number(0.0));
    }

    #[test]
    fn test_scatter_chart_groups_and_skips_undefined_growth() {
        let config = MetricsConfig::default();
        let chart = ChartPlotter::scatter_chart(&sample_pair(), &config);

        assert_eq!(chart.traces.len(), 2);
        let higher = chart.traces.iter().find(|t| t.name == HIGHER).unwrap();
        assert_eq!(higher.colors, vec![NAVY]);
        // Acarape has a zero baseline and is dropped
        assert_eq!(higher.text, vec!["Quixeramobim"]);
        assert_eq!(higher.x, vec![AxisValue::Number(40.0)]);
        assert_eq!(higher.y, vec![AxisValue::Number(50.0)]);

        let lower = chart.traces.iter().find(|t| t.name == LOWER).unwrap();
        assert_eq!(lower.colors, vec![SLATE]);
    }

    #[test]
    fn test_top_growth_chart_highlight() {
        let ranked = vec![
            RankedGrowth {
                municipality_id: "230010".to_string(),
                name: "Abaiara".to_string(),
                growth: 20.0,
            },
            RankedGrowth {
                municipality_id: "231140".to_string(),
                name: "Quixeramobim".to_string(),
                growth: 50.0,
            },
        ];

        let chart = ChartPlotter::top_growth_chart(&ranked, Some("Quixeramobim"));
        let bars = &chart.traces[0];
        assert_eq!(bars.orientation, Orientation::Horizontal);
        assert_eq!(bars.colors, vec![LIGHT_SLATE, NAVY]);
        assert_eq!(bars.text, vec!["20.0%", "50.0%"]);
        assert_eq!(bars.y[0], AxisValue::Label("Abaiara".to_string()));
    }

    #[test]
    fn test_chart_spec_serializes() {
        let chart = ChartPlotter::top_growth_chart(&[], None);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["traces"][0]["kind"], "bar");
        assert_eq!(json["traces"][0]["orientation"], "horizontal");
        assert!(json.get("shapes").is_none());
    }
}

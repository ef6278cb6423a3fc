use askama::Template;

use crate::types::activity::RoutePoint;
use crate::types::dashboard::{ChartRow, Dashboard, LatestRun, Route, YearToDate};

const TITLE: &str = "Strava — Last Activity";

const CHART_WIDTH: f64 = 960.0;
const CHART_HEIGHT: f64 = 120.0;
const BAR_HEIGHT: f64 = 48.0;
const BAR_TOP: f64 = 24.0;

const MAP_WIDTH: f64 = 960.0;
const MAP_HEIGHT: f64 = 540.0;
const MAP_PADDING: f64 = 32.0;
const MAP_ZOOM: u8 = 13;

const ACTUAL_COLOR: &str = "#FC4C02";
const TARGET_COLOR: &str = "#C9D6DF";
const ROUTE_COLOR: &str = "#FF0000";

const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage<'a> {
    title: &'a str,
    notices: &'a [String],
    ytd_metrics: Vec<Metric>,
    latest: Option<LatestRunView>,
    chart: ChartView,
}

#[derive(Template)]
#[template(path = "notice.html")]
struct NoticePage<'a> {
    title: &'a str,
    notices: &'a [String],
    message: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    title: &'a str,
    message: &'a str,
}

struct Metric {
    label: &'static str,
    value: String,
}

struct LatestRunView {
    name: String,
    metrics: Vec<Metric>,
    route: Option<RouteView>,
    raw_json: String,
}

/// Values are pre-formatted; `svg` is inserted unescaped and only ever
/// holds numbers and fixed labels.
struct RouteView {
    svg: String,
    point_count: usize,
    lat: String,
    lon: String,
    zoom: u8,
}

struct ChartView {
    svg: String,
    legend: Vec<LegendEntry>,
}

struct LegendEntry {
    color: &'static str,
    segment: &'static str,
    kms: String,
}

/// Renders a full dashboard page. Pure: the same input yields the same markup.
pub fn render_dashboard(dashboard: &Dashboard) -> Result<String, askama::Error> {
    DashboardPage {
        title: TITLE,
        notices: &dashboard.notices,
        ytd_metrics: year_to_date_metrics(&dashboard.year_to_date),
        latest: dashboard.latest_run.as_ref().map(latest_run_view),
        chart: render_chart(&dashboard.chart),
    }
    .render()
}

/// Page shown when the load halted.
pub fn render_error(message: &str) -> Result<String, askama::Error> {
    ErrorPage {
        title: TITLE,
        message,
    }
    .render()
}

/// Page shown when the load finished but there is nothing to chart.
pub fn render_notice_page(notices: &[String], message: &str) -> Result<String, askama::Error> {
    NoticePage {
        title: TITLE,
        notices,
        message,
    }
    .render()
}

fn year_to_date_metrics(ytd: &YearToDate) -> Vec<Metric> {
    vec![
        metric("Distance (km)", format!("{:.2}", ytd.distance_km)),
        metric("Moving time (min)", format!("{:.0}", ytd.moving_minutes)),
        metric("Avg pace (km/h)", format_optional(ytd.avg_speed_kmh)),
        metric("Total Activities", ytd.run_count.to_string()),
    ]
}

fn latest_run_view(latest: &LatestRun) -> LatestRunView {
    let summary = &latest.summary;
    LatestRunView {
        name: summary.name.clone(),
        metrics: vec![
            metric("Distance (km)", format!("{:.2}", summary.distance_km)),
            metric("Moving time (min)", format!("{:.0}", summary.moving_minutes)),
            metric("Avg speed (km/h)", format_optional(summary.avg_speed_kmh)),
            metric("Elevation (m)", format!("{:.0}", summary.elevation_gain_m)),
        ],
        route: latest.route.as_ref().map(route_view),
        raw_json: serde_json::to_string_pretty(&latest.raw)
            .unwrap_or_else(|_| latest.raw.to_string()),
    }
}

fn metric(label: &'static str, value: String) -> Metric {
    Metric { label, value }
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// One horizontal bar per label, segments stacked from zero in row order.
fn render_chart(rows: &[ChartRow]) -> ChartView {
    let total: f64 = rows.iter().map(|row| row.kms.max(0.0)).sum();
    let scale = if total > 0.0 { CHART_WIDTH / total } else { 0.0 };
    let label = rows.first().map(|row| row.label).unwrap_or("YTD");

    let mut x = 0.0;
    let mut segments = String::new();
    let mut legend = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let color = if i == 0 { ACTUAL_COLOR } else { TARGET_COLOR };
        let width = row.kms.max(0.0) * scale;
        segments.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}">"#,
            x, BAR_TOP, width, BAR_HEIGHT, color
        ));
        segments.push_str(&format!(
            "<title>{}: {:.2} km</title></rect>",
            row.segment, row.kms
        ));
        legend.push(LegendEntry {
            color,
            segment: row.segment,
            kms: format!("{:.2}", row.kms),
        });
        x += width;
    }

    let svg = format!(
        r#"<svg xmlns="{ns}" viewBox="0 0 {w} {h}" width="100%" role="img" aria-label="{label}">
        <text x="0" y="16" class="axis">{label}</text>
        {segments}
      </svg>"#,
        ns = SVG_NS,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        label = label,
        segments = segments,
    );

    ChartView { svg, legend }
}

fn route_view(route: &Route) -> RouteView {
    let projected = fit_to_viewport(&project(&route.points, route.centroid));
    let path = build_polyline_path(&projected);
    let dots = match (projected.first(), projected.last()) {
        (Some(start), Some(end)) if projected.len() > 1 => {
            render_endpoint_dots(*start, *end, 6.0)
        }
        _ => String::new(),
    };

    let svg = format!(
        r##"<svg xmlns="{ns}" viewBox="0 0 {w} {h}" width="100%">
        <rect width="{w}" height="{h}" fill="#F4F1EA"/>
        <path d="{path}" fill="none" stroke="{color}" stroke-width="4"
          stroke-linecap="round" stroke-linejoin="round"/>
        {dots}
      </svg>"##,
        ns = SVG_NS,
        w = MAP_WIDTH,
        h = MAP_HEIGHT,
        path = path,
        color = ROUTE_COLOR,
        dots = dots,
    );

    RouteView {
        svg,
        point_count: route.points.len(),
        lat: format!("{:.5}", route.centroid.lat),
        lon: format!("{:.5}", route.centroid.lon),
        zoom: MAP_ZOOM,
    }
}

/// Equirectangular projection around the centroid; y grows southwards.
fn project(points: &[RoutePoint], centroid: RoutePoint) -> Vec<(f64, f64)> {
    let lon_scale = centroid.lat.to_radians().cos();
    points
        .iter()
        .map(|p| ((p.lon - centroid.lon) * lon_scale, centroid.lat - p.lat))
        .collect()
}

fn fit_to_viewport(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(x, y) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let view_width = MAP_WIDTH - 2.0 * MAP_PADDING;
    let view_height = MAP_HEIGHT - 2.0 * MAP_PADDING;
    let content_width = (max_x - min_x).max(f64::EPSILON);
    let content_height = (max_y - min_y).max(f64::EPSILON);
    let scale = (view_width / content_width).min(view_height / content_height);
    let offset_x = MAP_PADDING + (view_width - content_width * scale) * 0.5;
    let offset_y = MAP_PADDING + (view_height - content_height * scale) * 0.5;

    points
        .iter()
        .map(|&(x, y)| (offset_x + (x - min_x) * scale, offset_y + (y - min_y) * scale))
        .collect()
}

fn build_polyline_path(coords: &[(f64, f64)]) -> String {
    coords
        .iter()
        .enumerate()
        .map(|(i, (x, y))| {
            let cmd = if i == 0 { 'M' } else { 'L' };
            format!("{}{:.2},{:.2}", cmd, x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_endpoint_dots(start: (f64, f64), end: (f64, f64), radius: f64) -> String {
    format!(
        r##"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="#2E7D32"/>
        <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="#212121"/>"##,
        start.0, start.1, radius, end.0, end.1, radius
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dashboard::ActivitySummary;
    use serde_json::json;

    fn dashboard(latest_run: Option<LatestRun>) -> Dashboard {
        Dashboard {
            notices: vec!["Token refreshed".to_string()],
            year_to_date: YearToDate {
                distance_km: 15.0,
                moving_minutes: 90.0,
                avg_speed_kmh: None,
                run_count: 2,
                target_today_km: 100.0,
                remaining_km: 85.0,
            },
            latest_run,
            chart: vec![
                ChartRow {
                    label: "YTD",
                    segment: "Actual",
                    kms: 15.0,
                },
                ChartRow {
                    label: "YTD",
                    segment: "Target",
                    kms: 85.0,
                },
            ],
        }
    }

    fn latest(route: Option<Route>) -> LatestRun {
        LatestRun {
            id: 9,
            summary: ActivitySummary {
                name: "Morning <Run>".to_string(),
                distance_km: 10.0,
                moving_minutes: 50.4,
                elapsed_minutes: 55.0,
                avg_speed_kmh: Some(11.9),
                elevation_gain_m: 42.4,
            },
            route,
            raw: json!({"id": 9, "name": "Morning <Run>"}),
        }
    }

    #[test]
    fn renders_metrics_with_placeholders() {
        let html = render_dashboard(&dashboard(Some(latest(None)))).unwrap();
        assert!(html.contains("Token refreshed"));
        assert!(html.contains("15.00"));
        assert!(html.contains("N/A"));
        assert!(html.contains("11.90"));
        assert!(html.contains("Elevation (m)"));
        assert!(html.contains("Morning &lt;Run&gt;"));
        assert!(!html.contains("Morning <Run>"));
    }

    #[test]
    fn omits_route_without_polyline() {
        let html = render_dashboard(&dashboard(Some(latest(None)))).unwrap();
        assert!(html.contains("No GPS route (polyline) available for this activity."));
        assert!(!html.contains("<h2>Route</h2>"));
        assert!(html.contains("Raw activity JSON"));
    }

    #[test]
    fn draws_route_when_present() {
        let route = Route {
            points: vec![
                RoutePoint::new(52.5200, 13.4050),
                RoutePoint::new(52.5205, 13.4060),
            ],
            centroid: RoutePoint::new(52.52025, 13.4055),
        };
        let html = render_dashboard(&dashboard(Some(latest(Some(route))))).unwrap();
        assert!(html.contains("<h2>Route</h2>"));
        assert!(html.contains(r#"<path d="M"#));
        assert!(html.contains("#map=13/52.52025/13.40550"));
    }

    #[test]
    fn reports_missing_runs() {
        let html = render_dashboard(&dashboard(None)).unwrap();
        assert!(html.contains("No runs found."));
        assert!(!html.contains("Raw activity JSON"));
    }

    #[test]
    fn chart_segments_fill_the_bar() {
        let chart = render_chart(&[
            ChartRow {
                label: "YTD",
                segment: "Actual",
                kms: 25.0,
            },
            ChartRow {
                label: "YTD",
                segment: "Target",
                kms: 75.0,
            },
        ]);
        assert!(chart.svg.contains(r#"x="0.00" y="24.00" width="240.00""#));
        assert!(chart.svg.contains(r#"x="240.00" y="24.00" width="720.00""#));
        assert_eq!(chart.legend.len(), 2);
        assert_eq!(chart.legend[1].kms, "75.00");
    }

    #[test]
    fn projected_route_stays_inside_viewport() {
        let points = [
            RoutePoint::new(1.0, 1.0),
            RoutePoint::new(1.01, 1.02),
            RoutePoint::new(0.99, 1.03),
        ];
        let fitted = fit_to_viewport(&project(&points, RoutePoint::new(1.0, 1.02)));
        for (x, y) in fitted {
            assert!((MAP_PADDING - 1e-6..=MAP_WIDTH - MAP_PADDING + 1e-6).contains(&x));
            assert!((MAP_PADDING - 1e-6..=MAP_HEIGHT - MAP_PADDING + 1e-6).contains(&y));
        }
    }

    #[test]
    fn error_page_escapes_message() {
        let html = render_error("Token refresh failed: <bad>").unwrap();
        assert!(html.contains("Token refresh failed: &lt;bad&gt;"));
        assert!(!html.contains("<bad>"));
    }

    #[test]
    fn notice_page_lists_notices_before_message() {
        let notices = vec!["Token refreshed".to_string()];
        let html = render_notice_page(&notices, "No activities found.").unwrap();
        let notice_at = html.find("Token refreshed").unwrap();
        let message_at = html.find("No activities found.").unwrap();
        assert!(notice_at < message_at);
    }
}

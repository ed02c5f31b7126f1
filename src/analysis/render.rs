// SVG chart rendering with plotters

use chrono::{Duration, NaiveDate};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

use super::{ChartArtifact, ChartData, ChartError, ChartKind, Series};

const CHART_SIZE: (u32, u32) = (800, 600);
const FONT: &str = "sans-serif";

// matplotlib "tab10"
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

pub fn render_chart(data: &ChartData) -> Result<ChartArtifact, ChartError> {
    if data.series.is_empty() {
        return Err(ChartError::Render("no rows to plot".to_string()));
    }

    let svg = match (&data.rule.kind, &data.series) {
        (ChartKind::Pie, Series::Categories(points)) => draw_pie(data, points)?,
        (ChartKind::Bar, Series::Categories(points)) => draw_bar(data, points)?,
        (ChartKind::Line, Series::Timeline(points)) => draw_line(data, points)?,
        (kind, _) => {
            return Err(ChartError::Render(format!(
                "{} chart cannot be drawn from this series",
                kind.as_str()
            )))
        }
    };

    Ok(ChartArtifact {
        kind: data.rule.kind,
        title: data.rule.title.to_string(),
        svg,
        labels: data.series.labels(),
        values: data.series.values(),
        shares: match data.rule.kind {
            ChartKind::Pie => data.percentages(),
            _ => Vec::new(),
        },
    })
}

fn draw_pie(data: &ChartData, points: &[(String, f64)]) -> Result<String, ChartError> {
    let sizes: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let total: f64 = sizes.iter().sum();
    if sizes.iter().any(|v| *v < 0.0) || total <= 0.0 {
        return Err(ChartError::Render(
            "pie slices need non-negative values with a positive total".to_string(),
        ));
    }

    let labels: Vec<&str> = points.iter().map(|(k, _)| k.as_str()).collect();
    let colors: Vec<RGBColor> = (0..points.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let root = root
            .titled(data.rule.title, (FONT, 24))
            .map_err(render_err)?;

        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style((FONT, 16).into_font().color(&BLACK));
        pie.percentages((FONT, radius * 0.08).into_font().color(&WHITE));
        root.draw(&pie).map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

fn draw_bar(data: &ChartData, points: &[(String, f64)]) -> Result<String, ChartError> {
    let count = points.len() as u32;
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let min = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let top = if max > 0.0 { max * 1.05 } else { 1.0 };

    let mut svg = String::new();
    let anchors: Vec<(i32, i32)>;
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(data.rule.title, (FONT, 24))
            .x_label_area_size(110)
            .y_label_area_size(90)
            .build_cartesian_2d((0u32..count).into_segmented(), min * 1.05..top)
            .map_err(render_err)?;

        // Category names are drawn separately, rotated.
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(points.len())
            .x_label_formatter(&|_| String::new())
            .x_desc(data.rule.x_label.unwrap_or_default())
            .y_desc(data.rule.y_label.unwrap_or_default())
            .axis_desc_style((FONT, 16))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(PALETTE[0].filled())
                    .margin(8)
                    .data(points.iter().enumerate().map(|(i, (_, v))| (i as u32, *v))),
            )
            .map_err(render_err)?;

        anchors = (0..count)
            .map(|i| chart.backend_coord(&(SegmentValue::CenterOf(i), min * 1.05)))
            .collect();
        root.present().map_err(render_err)?;
    }

    let labels: Vec<&str> = points.iter().map(|(k, _)| k.as_str()).collect();
    append_rotated_labels(&mut svg, &labels, &anchors);
    Ok(svg)
}

fn draw_line(data: &ChartData, points: &[(NaiveDate, f64)]) -> Result<String, ChartError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(ChartError::Render("no rows to plot".to_string()));
    };
    let start = first.0;
    // A single date still needs a non-empty axis.
    let end = if last.0 > start { last.0 } else { start + Duration::days(1) };

    let max = points.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
    let min = points.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min);
    let pad = ((max - min).abs() * 0.05).max(1.0);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(data.rule.title, (FONT, 24))
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(start..end, (min - pad)..(max + pad))
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .x_desc(data.rule.x_label.unwrap_or_default())
            .y_desc(data.rule.y_label.unwrap_or_default())
            .axis_desc_style((FONT, 16))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), PALETTE[0].stroke_width(2)))
            .map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Insert category labels rotated by 45 degrees below each bar.
fn append_rotated_labels(svg: &mut String, labels: &[&str], anchors: &[(i32, i32)]) {
    let mut markup = String::new();
    for (label, (x, y)) in labels.iter().zip(anchors) {
        let y = y + 14;
        markup.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="end" font-family="{FONT}" font-size="14" transform="rotate(-45 {x} {y})">{}</text>"#,
            escape_xml(label)
        ));
        markup.push('\n');
    }
    match svg.rfind("</svg>") {
        Some(pos) => svg.insert_str(pos, &markup),
        None => svg.push_str(&markup),
    }
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

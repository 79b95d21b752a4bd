//! Report rendering: turns an aggregate result table into a static bar
//! chart. Pure consumer of core output; no transformation logic lives here.

use crate::error::{InsightError, Result};
use crate::table::{ColumnValues, Table};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

const CHART_WIDTH: f64 = 960.0;
const CHART_HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 120.0;
const MARGIN_TOP: f64 = 60.0;
const BAR_GAP: f64 = 12.0;
const BAR_FILL: &str = "skyblue";

/// Renders one bar per row of `table` into an SVG file at `output_path`.
/// `category_column` must be textual and `value_column` numeric; the table
/// is expected to arrive pre-sorted by value descending (the query's
/// ORDER BY), and is drawn in row order either way.
pub fn render(
    table: &Table,
    category_column: &str,
    value_column: &str,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let categories = match &table
        .column(category_column)
        .ok_or_else(|| InsightError::MissingColumn(category_column.to_string()))?
        .values
    {
        ColumnValues::Textual(v) => v,
        ColumnValues::Numeric(_) => {
            return Err(InsightError::Config(format!(
                "category column '{}' must be textual",
                category_column
            )))
        }
    };
    let values = match &table
        .column(value_column)
        .ok_or_else(|| InsightError::MissingColumn(value_column.to_string()))?
        .values
    {
        ColumnValues::Numeric(v) => v,
        ColumnValues::Textual(_) => {
            return Err(InsightError::Config(format!(
                "value column '{}' must be numeric",
                value_column
            )))
        }
    };

    let bars: Vec<(&str, f64)> = categories
        .iter()
        .zip(values.iter())
        .filter_map(|(cat, val)| Some((cat.as_deref()?, (*val)?)))
        .collect();

    let svg = draw_bar_chart(&bars, title);
    fs::write(output_path, svg).map_err(|e| {
        InsightError::DestinationWrite(format!(
            "failed to write chart '{}': {}",
            output_path.display(),
            e
        ))
    })?;

    info!(bars = bars.len(), chart = %output_path.display(), "rendered report");
    Ok(())
}

fn draw_bar_chart(bars: &[(&str, f64)], title: &str) -> String {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - 20.0;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max_value = bars
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let bar_width = if bars.is_empty() {
        plot_width
    } else {
        (plot_width - BAR_GAP * bars.len() as f64) / bars.len() as f64
    };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-size="20" font-family="sans-serif">{}</text>"#,
        CHART_WIDTH / 2.0,
        escape_xml(title)
    );
    // Baseline axis
    let baseline = MARGIN_TOP + plot_height;
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black"/>"#,
        MARGIN_LEFT,
        baseline,
        MARGIN_LEFT + plot_width,
        baseline
    );

    for (index, (category, value)) in bars.iter().enumerate() {
        let height = (value / max_value) * plot_height;
        let x = MARGIN_LEFT + BAR_GAP / 2.0 + index as f64 * (bar_width + BAR_GAP);
        let y = baseline - height;
        let _ = writeln!(
            svg,
            r#"<rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, bar_width, height, BAR_FILL
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12" font-family="sans-serif">{:.0}</text>"#,
            x + bar_width / 2.0,
            y - 6.0,
            value
        );
        // Rotated category label under the bar
        let label_x = x + bar_width / 2.0;
        let label_y = baseline + 16.0;
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12" font-family="sans-serif" transform="rotate(-45 {:.1} {:.1})">{}</text>"#,
            label_x,
            label_y,
            label_x,
            label_y,
            escape_xml(category)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn aggregate_table() -> Table {
        Table::new(vec![
            Column::textual(
                "job_title_category",
                vec![Some("Engineering".to_string()), Some("Design".to_string())],
            ),
            Column::numeric("avg_salary", vec![Some(120_000.0), Some(90_000.0)]),
        ])
    }

    #[test]
    fn renders_one_bar_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        render(
            &aggregate_table(),
            "job_title_category",
            "avg_salary",
            "Average Salary by Job Title Category",
            &path,
        )
        .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches(r#"class="bar""#).count(), 2);
        assert!(svg.contains("Engineering"));
        assert!(svg.contains("Average Salary by Job Title Category"));
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        let result = render(&aggregate_table(), "nope", "avg_salary", "t", &path);
        assert!(matches!(result, Err(InsightError::MissingColumn(_))));
    }

    #[test]
    fn swapped_column_types_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        let result = render(
            &aggregate_table(),
            "avg_salary",
            "job_title_category",
            "t",
            &path,
        );
        assert!(matches!(result, Err(InsightError::Config(_))));
    }
}

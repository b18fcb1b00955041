use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::output::OutputArtifacts;
use crate::sampler::TrajectorySampler;

const CANVAS_SIZE: (u32, u32) = (800, 460);

/// Renders the final trajectory chart to PNG and SVG, per the output toggles.
pub fn render_trajectory(sampler: &TrajectorySampler, artifacts: &OutputArtifacts) -> Result<()> {
    if sampler.points().is_empty() {
        return Err(anyhow!("No samples available for plotting"));
    }

    if artifacts.toggles.png {
        ensure_parent(&artifacts.trajectory_png)?;
        let backend = BitMapBackend::new(&artifacts.trajectory_png, CANVAS_SIZE);
        draw_trajectory_chart(backend.into_drawing_area(), sampler)?;
    }

    if artifacts.toggles.svg {
        ensure_parent(&artifacts.trajectory_svg)?;
        let backend = SVGBackend::new(&artifacts.trajectory_svg, CANVAS_SIZE);
        draw_trajectory_chart(backend.into_drawing_area(), sampler)?;
    }

    Ok(())
}

/// Renders one animation frame as PNG.
pub fn render_frame(sampler: &TrajectorySampler, path: &Path) -> Result<()> {
    if sampler.points().is_empty() {
        return Err(anyhow!("No samples available for plotting"));
    }

    ensure_parent(path)?;
    let backend = BitMapBackend::new(path, CANVAS_SIZE);
    draw_trajectory_chart(backend.into_drawing_area(), sampler)
}

fn draw_trajectory_chart<DB: DrawingBackend>(
    drawing_area: DrawingArea<DB, Shift>,
    sampler: &TrajectorySampler,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let points = sampler.points();
    let (x_lower, x_upper) = normalize_viewport(sampler);

    let radius = sampler.params().radius;
    let y_upper = (radius.abs() * 1.05).max(1e-3);

    let root = drawing_area;
    root.fill(&WHITE)?;

    let (title_area, chart_area) = root.split_vertically(36);
    let title_style_base = ("sans-serif", 28).into_text_style(&title_area);
    let title_style = title_style_base.pos(Pos::new(HPos::Center, VPos::Center));
    let title_dims = title_area.dim_in_pixel();
    title_area.draw_text(
        "Trajectory of point on wheel",
        &title_style,
        (title_dims.0 as i32 / 2, title_dims.1 as i32 / 2),
    )?;

    let mut chart = ChartBuilder::on(&chart_area)
        .margin_left(52)
        .margin_right(18)
        .margin_bottom(40)
        .margin_top(6)
        .set_label_area_size(LabelAreaPosition::Left, 58)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x_lower..x_upper, 0.0..y_upper)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("x (m)")
        .y_desc("y (m)")
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 20))
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().map(|point| (point.x, point.y)),
        &RED,
    ))?;

    // Marker at the rim point for the newest sample, like the animated view.
    if let Some(newest) = points.back() {
        chart.draw_series(std::iter::once(Circle::new(
            (newest.x, newest.y),
            4,
            BLUE.filled(),
        )))?;
    }

    chart.draw_series(std::iter::once(PathElement::new(
        vec![
            (x_lower, 0.0),
            (x_upper, 0.0),
            (x_upper, y_upper),
            (x_lower, y_upper),
            (x_lower, 0.0),
        ],
        &BLACK,
    )))?;

    chart_area
        .present()
        .map_err(|e| anyhow!("Failed to render trajectory chart: {:?}", e))?;
    Ok(())
}

// The suggested viewport reverses under negative velocity and collapses when
// the velocity is zero; plotters needs an increasing, non-degenerate range.
fn normalize_viewport(sampler: &TrajectorySampler) -> (f64, f64) {
    let view = sampler.viewport();
    let (mut lower, mut upper) = if view.x_min <= view.x_max {
        (view.x_min, view.x_max)
    } else {
        (view.x_max, view.x_min)
    };
    if (upper - lower).abs() < 1e-9 {
        lower -= 0.5;
        upper += 0.5;
    }
    (lower, upper)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create plot directory {}", parent.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{TrajectorySampler, WheelParameters};

    fn sampler(velocity: f64) -> TrajectorySampler {
        TrajectorySampler::new(WheelParameters {
            radius: 1.0,
            velocity,
            time_step: 0.1,
            max_points: 100,
            animation_duration: 10.0,
        })
    }

    #[test]
    fn normalized_viewport_is_increasing_for_negative_velocity() {
        let mut s = sampler(-2.0);
        s.recompute_full(5.0);
        let (lower, upper) = normalize_viewport(&s);
        assert!(lower < upper);
    }

    #[test]
    fn zero_velocity_viewport_is_widened() {
        let s = sampler(0.0);
        let (lower, upper) = normalize_viewport(&s);
        assert!(upper - lower >= 1.0 - 1e-12);
    }
}

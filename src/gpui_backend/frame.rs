use gpui::{Bounds, Pixels, Window};

use crate::axis::{Axis, AxisPosition, TextMeasurer, Tick, compute_ticks};
use crate::chart::ChartXY;
use crate::geom::{Dimension, Point, ScreenPoint, ScreenRect};
use crate::interaction::ChartRegions;
use crate::render::{
    Color, LineSegment, LineStyle, MarkerStyle, RectStyle, RenderCacheKey, RenderCommand,
    RenderList, TextStyle, build_line_segments, build_markers,
};
use crate::series::{FillStyle, LineSeries};
use crate::style::Theme;
use crate::transform::Transform;

use super::config::ChartViewConfig;
use super::geometry::{clamp_point, distance_sq, inset};
use super::state::ChartUiState;
use super::text::GpuiTextMeasurer;

const AXIS_PADDING: f32 = 4.0;
const TICK_LENGTH: f32 = 5.0;
const LABEL_GAP: f32 = 2.0;
const OUTER_MARGIN: f32 = 10.0;
const TITLE_PADDING: f32 = 6.0;
const MARKER_SIZE: f32 = 4.0;
const CURSOR_MARKER_SIZE: f32 = 7.0;
const READOUT_OFFSET: f32 = 12.0;
const READOUT_LINE_HEIGHT: f32 = 14.0;
const READOUT_TEXT_SIZE: f32 = 12.0;
const PAUSED_HINT: &str = "Scrolling paused, double-click to resume";

#[derive(Debug, Clone)]
pub(crate) struct ChartFrame {
    pub(crate) render: RenderList,
}

struct YAxisColumn<'a> {
    axis: &'a Axis,
    rect: ScreenRect,
    ticks: Vec<Tick>,
}

pub(crate) fn build_frame(
    chart: &ChartXY,
    state: &mut ChartUiState,
    config: &ChartViewConfig,
    bounds: Bounds<Pixels>,
    window: &Window,
) -> ChartFrame {
    let mut render = RenderList::new();

    let full_width = f32::from(bounds.size.width);
    let full_height = f32::from(bounds.size.height);
    if full_width <= 1.0 || full_height <= 1.0 {
        return ChartFrame { render };
    }
    let origin = ScreenPoint::new(f32::from(bounds.origin.x), f32::from(bounds.origin.y));
    let full_rect = ScreenRect::from_origin_size(origin, full_width, full_height);
    let theme = chart.theme();
    let measurer = GpuiTextMeasurer::new(window);

    render.push(RenderCommand::Rect {
        rect: full_rect,
        style: RectStyle::filled(theme.panel),
    });

    let title_size = measurer.measure(chart.title(), config.title_size);
    let title_band = title_size.1 + TITLE_PADDING * 2.0;
    let label_height = measurer.measure("0", config.label_size).1;
    let x_title_height = chart
        .default_axis_x()
        .title()
        .map_or(0.0, |title| measurer.measure(title, config.label_size).1 + AXIS_PADDING);
    let x_axis_height = label_height + TICK_LENGTH + AXIS_PADDING * 2.0 + x_title_height;

    let plot_top = origin.y + title_band;
    let plot_bottom = (full_rect.max.y - x_axis_height).max(plot_top + 1.0);
    let plot_height = plot_bottom - plot_top;

    // Y axis widths depend on their labels, which depend on the plot height.
    let mut left_width = 0.0;
    let mut right_width = 0.0;
    let mut columns = Vec::new();
    for axis in chart.axes_y() {
        let ticks = compute_ticks(axis, plot_height, config.y_tick_spacing_px);
        let label_width = ticks
            .iter()
            .map(|tick| measurer.measure(&tick.label, config.label_size).0)
            .fold(0.0_f32, f32::max);
        let width = label_width + TICK_LENGTH + AXIS_PADDING * 2.0;
        let (x0, x1) = match axis.position() {
            AxisPosition::Default => {
                left_width += width;
                (origin.x + left_width - width, origin.x + left_width)
            }
            AxisPosition::Opposite => {
                right_width += width;
                (
                    full_rect.max.x - right_width,
                    full_rect.max.x - right_width + width,
                )
            }
        };
        columns.push(YAxisColumn {
            axis,
            rect: ScreenRect::new(ScreenPoint::new(x0, plot_top), ScreenPoint::new(x1, plot_bottom)),
            ticks,
        });
    }
    let left_width = if left_width > 0.0 { left_width } else { OUTER_MARGIN };
    let right_width = if right_width > 0.0 { right_width } else { OUTER_MARGIN };
    let plot_left = origin.x + left_width;
    let plot_right = (full_rect.max.x - right_width).max(plot_left + 1.0);

    // Left columns were stacked from the outer edge; flip them so the first
    // default axis hugs the series area.
    for column in &mut columns {
        if column.axis.position() == AxisPosition::Default {
            let width = column.rect.width();
            let from_outer = column.rect.min.x - origin.x;
            let x1 = plot_left - from_outer;
            column.rect = ScreenRect::new(
                ScreenPoint::new(x1 - width, plot_top),
                ScreenPoint::new(x1, plot_bottom),
            );
        } else {
            let width = column.rect.width();
            let from_outer = full_rect.max.x - column.rect.max.x;
            let x0 = plot_right + from_outer;
            column.rect = ScreenRect::new(
                ScreenPoint::new(x0, plot_top),
                ScreenPoint::new(x0 + width, plot_bottom),
            );
        }
    }

    let plot_rect = ScreenRect::new(
        ScreenPoint::new(plot_left, plot_top),
        ScreenPoint::new(plot_right, plot_bottom),
    );
    let x_axis_rect = ScreenRect::new(
        ScreenPoint::new(plot_rect.min.x, plot_rect.max.y),
        ScreenPoint::new(plot_rect.max.x, full_rect.max.y),
    );
    state.regions = ChartRegions {
        plot: plot_rect,
        x_axis: x_axis_rect,
        y_axes: columns.iter().map(|column| (column.axis.id(), column.rect)).collect(),
    };
    state.plot_rect = Some(plot_rect);
    state.retain_series(|id| chart.series_by_id(id).is_some());

    render.push(RenderCommand::Rect {
        rect: plot_rect,
        style: RectStyle::filled(theme.plot_area),
    });
    build_title(&mut render, chart, config, full_rect, title_size);

    let x_axis = chart.default_axis_x();
    let primary = chart.default_axis_y_id().and_then(|id| chart.axis(id));
    let Some(primary_transform) = primary
        .and_then(|axis| Transform::new(x_axis.interval(), axis.interval(), plot_rect))
    else {
        build_message(&mut render, theme, &measurer, plot_rect, "Invalid axis range");
        return ChartFrame { render };
    };

    let x_ticks = compute_ticks(x_axis, plot_rect.width(), config.x_tick_spacing_px);
    let primary_ticks = columns
        .iter()
        .find(|column| Some(column.axis.id()) == primary.map(Axis::id))
        .map(|column| column.ticks.as_slice())
        .unwrap_or_default();
    build_grid(&mut render, theme, &x_ticks, primary_ticks, &primary_transform, plot_rect);
    build_series(&mut render, chart, state, plot_rect);
    build_x_axis(
        &mut render,
        theme,
        config,
        x_axis,
        &x_ticks,
        &primary_transform,
        x_axis_rect,
        &measurer,
    );
    for column in &columns {
        build_y_axis(&mut render, theme, config, x_axis, column, plot_rect, &measurer);
    }
    if chart.is_view_stopped() {
        let size = measurer.measure(PAUSED_HINT, config.label_size);
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(
                plot_rect.max.x - size.0 - AXIS_PADDING,
                plot_rect.min.y + AXIS_PADDING,
            ),
            text: PAUSED_HINT.to_string(),
            style: TextStyle {
                color: theme.axis.with_alpha(0.8),
                size: config.label_size,
            },
        });
    }
    if config.show_cursor {
        build_cursor(&mut render, chart, state, plot_rect, &measurer);
    }

    ChartFrame { render }
}

fn build_title(
    render: &mut RenderList,
    chart: &ChartXY,
    config: &ChartViewConfig,
    full_rect: ScreenRect,
    size: (f32, f32),
) {
    if chart.title().is_empty() {
        return;
    }
    render.push(RenderCommand::Text {
        position: ScreenPoint::new(
            full_rect.min.x + (full_rect.width() - size.0) * 0.5,
            full_rect.min.y + TITLE_PADDING,
        ),
        text: chart.title().to_string(),
        style: TextStyle {
            color: chart.theme().title,
            size: config.title_size,
        },
    });
}

fn build_message(
    render: &mut RenderList,
    theme: &Theme,
    measurer: &GpuiTextMeasurer<'_>,
    plot_rect: ScreenRect,
    message: &str,
) {
    let size = measurer.measure(message, 14.0);
    render.push(RenderCommand::Text {
        position: ScreenPoint::new(
            plot_rect.min.x + (plot_rect.width() - size.0) * 0.5,
            plot_rect.min.y + (plot_rect.height() - size.1) * 0.5,
        ),
        text: message.to_string(),
        style: TextStyle {
            color: theme.axis,
            size: 14.0,
        },
    });
}

fn build_grid(
    render: &mut RenderList,
    theme: &Theme,
    x_ticks: &[Tick],
    y_ticks: &[Tick],
    transform: &Transform,
    plot_rect: ScreenRect,
) {
    let vertical = x_ticks.iter().map(|tick| {
        let x = transform.x_to_screen(tick.value);
        LineSegment::new(
            ScreenPoint::new(x, plot_rect.min.y),
            ScreenPoint::new(x, plot_rect.max.y),
        )
    });
    let horizontal = y_ticks.iter().map(|tick| {
        let y = transform.y_to_screen(tick.value);
        LineSegment::new(
            ScreenPoint::new(plot_rect.min.x, y),
            ScreenPoint::new(plot_rect.max.x, y),
        )
    });
    let segments: Vec<LineSegment> = vertical.chain(horizontal).collect();
    if segments.is_empty() {
        return;
    }
    render.push(RenderCommand::ClipRect(plot_rect));
    render.push(RenderCommand::LineSegments {
        segments,
        style: LineStyle::new(theme.grid, 1.0),
    });
    render.push(RenderCommand::ClipEnd);
}

fn series_transform(chart: &ChartXY, series: &LineSeries, plot_rect: ScreenRect) -> Option<Transform> {
    let y_axis = chart.axis(series.y_axis())?;
    Transform::new(chart.default_axis_x().interval(), y_axis.interval(), plot_rect)
}

fn build_series(
    render: &mut RenderList,
    chart: &ChartXY,
    state: &mut ChartUiState,
    plot_rect: ScreenRect,
) {
    let size = (
        plot_rect.width().round() as u32,
        plot_rect.height().round() as u32,
    );

    render.push(RenderCommand::ClipRect(plot_rect));

    for series in chart.series() {
        if !series.is_visible() {
            continue;
        }
        let Some(transform) = series_transform(chart, series, plot_rect) else {
            continue;
        };
        let x = chart.default_axis_x().interval();
        let Some(y) = chart.axis(series.y_axis()).map(Axis::interval) else {
            continue;
        };
        let cache = state.series_cache.entry(series.id()).or_default();
        let key = RenderCacheKey {
            x,
            y,
            size,
            generation: series.store().generation(),
        };
        if cache.key != Some(key) {
            let (range, pixels) = match series.pattern_dimension() {
                Some(Dimension::Y) => (y.range(), size.1 as usize),
                _ => (x.range(), size.0 as usize),
            };
            let decimated = series.store().decimate(
                range,
                pixels.max(1),
                &mut state.decimation_scratch,
            );
            cache.points.clear();
            cache.points.extend_from_slice(decimated);
            cache.key = Some(key);
        }

        let mut segments = Vec::new();
        build_line_segments(&cache.points, &transform, plot_rect, &mut segments);
        if !segments.is_empty() {
            render.push(RenderCommand::LineSegments {
                segments,
                style: series.stroke(),
            });
        }
        if let FillStyle::Solid(color) = series.fill() {
            let mut points = Vec::new();
            build_markers(&cache.points, &transform, plot_rect, &mut points);
            if !points.is_empty() {
                render.push(RenderCommand::Points {
                    points,
                    style: MarkerStyle {
                        color,
                        size: MARKER_SIZE,
                    },
                });
            }
        }
    }

    render.push(RenderCommand::ClipEnd);
}

#[allow(clippy::too_many_arguments)]
fn build_x_axis(
    render: &mut RenderList,
    theme: &Theme,
    config: &ChartViewConfig,
    axis: &Axis,
    ticks: &[Tick],
    transform: &Transform,
    axis_rect: ScreenRect,
    measurer: &GpuiTextMeasurer<'_>,
) {
    let top = axis_rect.min.y;
    let mut segments = vec![LineSegment::new(
        ScreenPoint::new(axis_rect.min.x, top),
        ScreenPoint::new(axis_rect.max.x, top),
    )];
    let mut last_label_right = f32::NEG_INFINITY;
    for tick in ticks {
        let x = transform.x_to_screen(tick.value);
        segments.push(LineSegment::new(
            ScreenPoint::new(x, top),
            ScreenPoint::new(x, top + TICK_LENGTH),
        ));
        let size = measurer.measure(&tick.label, config.label_size);
        let pos = clamp_point(
            ScreenPoint::new(x - size.0 * 0.5, top + TICK_LENGTH + AXIS_PADDING),
            axis_rect,
            size,
        );
        if pos.x >= last_label_right + LABEL_GAP {
            render.push(RenderCommand::Text {
                position: pos,
                text: tick.label.clone(),
                style: TextStyle {
                    color: theme.axis,
                    size: config.label_size,
                },
            });
            last_label_right = pos.x + size.0;
        }
    }
    if let Some(title) = axis.title() {
        let size = measurer.measure(title, config.label_size);
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(
                axis_rect.min.x + (axis_rect.width() - size.0) * 0.5,
                axis_rect.max.y - size.1 - AXIS_PADDING,
            ),
            text: title.to_string(),
            style: TextStyle {
                color: theme.axis,
                size: config.label_size,
            },
        });
    }
    render.push(RenderCommand::LineSegments {
        segments,
        style: LineStyle::new(theme.axis, 1.0),
    });
}

fn build_y_axis(
    render: &mut RenderList,
    theme: &Theme,
    config: &ChartViewConfig,
    x_axis: &Axis,
    column: &YAxisColumn<'_>,
    plot_rect: ScreenRect,
    measurer: &GpuiTextMeasurer<'_>,
) {
    let Some(transform) = Transform::new(x_axis.interval(), column.axis.interval(), plot_rect)
    else {
        return;
    };
    let opposite = column.axis.position() == AxisPosition::Opposite;
    let edge = if opposite {
        column.rect.min.x
    } else {
        column.rect.max.x
    };
    let direction = if opposite { 1.0 } else { -1.0 };
    let mut segments = vec![LineSegment::new(
        ScreenPoint::new(edge, column.rect.min.y),
        ScreenPoint::new(edge, column.rect.max.y),
    )];
    let mut last_label_center: Option<f32> = None;
    for tick in &column.ticks {
        let y = transform.y_to_screen(tick.value);
        segments.push(LineSegment::new(
            ScreenPoint::new(edge, y),
            ScreenPoint::new(edge + direction * TICK_LENGTH, y),
        ));
        let size = measurer.measure(&tick.label, config.label_size);
        let x = if opposite {
            edge + TICK_LENGTH + AXIS_PADDING
        } else {
            edge - TICK_LENGTH - AXIS_PADDING - size.0
        };
        let pos = clamp_point(ScreenPoint::new(x, y - size.1 * 0.5), column.rect, size);
        let center = pos.y + size.1 * 0.5;
        let fits = last_label_center.is_none_or(|last| (center - last).abs() >= size.1 + LABEL_GAP);
        if fits {
            render.push(RenderCommand::Text {
                position: pos,
                text: tick.label.clone(),
                style: TextStyle {
                    color: theme.axis,
                    size: config.label_size,
                },
            });
            last_label_center = Some(center);
        }
    }
    if let Some(title) = column.axis.title() {
        let size = measurer.measure(title, config.label_size);
        let pos = ScreenPoint::new(
            column.rect.min.x + (column.rect.width() - size.0) * 0.5,
            column.rect.min.y - size.1 - LABEL_GAP,
        );
        render.push(RenderCommand::Text {
            position: pos,
            text: title.to_string(),
            style: TextStyle {
                color: theme.axis,
                size: config.label_size,
            },
        });
    }
    render.push(RenderCommand::LineSegments {
        segments,
        style: LineStyle::new(theme.axis, 1.0),
    });
}

struct CursorHit<'a> {
    series: &'a LineSeries,
    point: Point,
    screen: ScreenPoint,
    transform: Transform,
}

fn build_cursor(
    render: &mut RenderList,
    chart: &ChartXY,
    state: &ChartUiState,
    plot_rect: ScreenRect,
    measurer: &GpuiTextMeasurer<'_>,
) {
    let Some(pointer) = state.hover else { return };
    if !plot_rect.contains(pointer) || state.drag.as_ref().is_some_and(|drag| drag.active) {
        return;
    }

    let mut best: Option<(f32, CursorHit<'_>)> = None;
    for series in chart.series().iter().filter(|series| series.is_visible()) {
        let Some(transform) = series_transform(chart, series, plot_rect) else {
            continue;
        };
        let target = transform.screen_to_data(pointer);
        let (ux, uy) = transform.units_per_pixel();
        let Some(point) = series.solve_cursor(target, (1.0 / ux.abs(), 1.0 / uy.abs())) else {
            continue;
        };
        let Some(screen) = transform.data_to_screen(point) else {
            continue;
        };
        if !plot_rect.contains(screen) {
            continue;
        }
        let distance = distance_sq(screen, pointer);
        if best.as_ref().is_none_or(|(d, _)| distance < *d) {
            best = Some((
                distance,
                CursorHit {
                    series,
                    point,
                    screen,
                    transform,
                },
            ));
        }
    }
    let Some((_, hit)) = best else { return };
    let theme = chart.theme();

    render.push(RenderCommand::ClipRect(plot_rect));
    render.push(RenderCommand::LineSegments {
        segments: vec![
            LineSegment::new(
                ScreenPoint::new(plot_rect.min.x, hit.screen.y),
                ScreenPoint::new(plot_rect.max.x, hit.screen.y),
            ),
            LineSegment::new(
                ScreenPoint::new(hit.screen.x, plot_rect.min.y),
                ScreenPoint::new(hit.screen.x, plot_rect.max.y),
            ),
        ],
        style: LineStyle::new(theme.cursor.with_alpha(0.45), 1.0),
    });
    render.push(RenderCommand::Points {
        points: vec![hit.screen],
        style: MarkerStyle {
            color: hit.series.stroke().color,
            size: CURSOR_MARKER_SIZE,
        },
    });
    render.push(RenderCommand::ClipEnd);

    let (ux, uy) = hit.transform.units_per_pixel();
    let x_text = chart
        .default_axis_x()
        .formatter()
        .format(hit.point.x, ux.abs());
    let y_text = chart
        .axis(hit.series.y_axis())
        .map(|axis| axis.formatter().format(hit.point.y, uy.abs()))
        .unwrap_or_default();
    let lines = vec![
        hit.series.name().to_string(),
        format!("x: {x_text}"),
        format!("y: {y_text}"),
    ];
    let size = measurer.measure_block(&lines, READOUT_TEXT_SIZE);
    let mut origin = ScreenPoint::new(hit.screen.x + READOUT_OFFSET, hit.screen.y + READOUT_OFFSET);
    if origin.x + size.0 > plot_rect.max.x {
        origin.x = hit.screen.x - size.0 - READOUT_OFFSET;
    }
    if origin.y + size.1 > plot_rect.max.y {
        origin.y = hit.screen.y - size.1 - READOUT_OFFSET;
    }
    let origin = clamp_point(origin, inset(plot_rect, 1.0), size);

    render.push(RenderCommand::Rect {
        rect: ScreenRect::from_origin_size(origin, size.0, size.1),
        style: RectStyle {
            fill: theme.cursor_fill,
            stroke: with_alpha(hit.series.stroke().color, 0.8),
            stroke_width: 1.0,
        },
    });
    for (index, line) in lines.into_iter().enumerate() {
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(
                origin.x + 4.0,
                origin.y + index as f32 * READOUT_LINE_HEIGHT + 2.0,
            ),
            text: line,
            style: TextStyle {
                color: theme.cursor,
                size: READOUT_TEXT_SIZE,
            },
        });
    }
}

fn with_alpha(color: Color, alpha: f32) -> Color {
    color.with_alpha((color.a * alpha).clamp(0.0, 1.0))
}

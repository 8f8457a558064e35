use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, TextRun, Window,
    font, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{
    Color, LineSegment, LineStyle, MarkerStyle, RectStyle, RenderCommand, TextStyle,
};

use super::frame::ChartFrame;
use super::text::UI_FONT;

pub(crate) fn paint_frame(frame: &ChartFrame, window: &mut Window, cx: &mut App) {
    let mut clip_stack: Vec<ContentMask<Pixels>> = Vec::new();
    for command in frame.render.commands() {
        match command {
            RenderCommand::ClipRect(rect) => {
                clip_stack.push(ContentMask {
                    bounds: to_bounds(*rect),
                });
            }
            RenderCommand::ClipEnd => {
                clip_stack.pop();
            }
            RenderCommand::LineSegments { segments, style } => {
                with_clip(window, &clip_stack, |window| {
                    paint_lines(window, segments, *style);
                });
            }
            RenderCommand::Points { points, style } => {
                with_clip(window, &clip_stack, |window| {
                    paint_points(window, points, *style);
                });
            }
            RenderCommand::Rect { rect, style } => {
                with_clip(window, &clip_stack, |window| {
                    paint_rect(window, *rect, *style);
                });
            }
            RenderCommand::Text {
                position,
                text,
                style,
            } => {
                with_clip(window, &clip_stack, |window| {
                    paint_text(window, cx, *position, text, style);
                });
            }
        }
    }
}

fn paint_lines(window: &mut Window, segments: &[LineSegment], style: LineStyle) {
    if segments.is_empty() {
        return;
    }
    let mut builder = PathBuilder::stroke(px(style.width.max(0.5)));
    let mut pen: Option<ScreenPoint> = None;
    for segment in segments {
        // Connected segments continue the current subpath.
        if pen != Some(segment.start) {
            builder.move_to(point(px(segment.start.x), px(segment.start.y)));
        }
        builder.line_to(point(px(segment.end.x), px(segment.end.y)));
        pen = Some(segment.end);
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(style.color));
    }
}

fn paint_points(window: &mut Window, points: &[ScreenPoint], style: MarkerStyle) {
    let half = style.size.max(2.0) * 0.5;
    let color = to_rgba(style.color);
    for pt in points {
        let bounds = Bounds::from_corners(
            point(px(pt.x - half), px(pt.y - half)),
            point(px(pt.x + half), px(pt.y + half)),
        );
        window.paint_quad(quad(
            bounds,
            Corners::all(px(0.0)),
            color,
            Edges::all(px(0.0)),
            color,
            BorderStyle::default(),
        ));
    }
}

fn paint_rect(window: &mut Window, rect: ScreenRect, style: RectStyle) {
    if !rect.is_valid() {
        return;
    }
    let quad = quad(
        to_bounds(rect),
        Corners::all(px(2.0)),
        to_rgba(style.fill),
        Edges::all(px(style.stroke_width)),
        to_rgba(style.stroke),
        BorderStyle::default(),
    );
    window.paint_quad(quad);
}

fn paint_text(
    window: &mut Window,
    cx: &mut App,
    position: ScreenPoint,
    text: &str,
    style: &TextStyle,
) {
    if text.is_empty() {
        return;
    }
    let run = TextRun {
        len: text.len(),
        font: font(UI_FONT),
        color: to_hsla(style.color),
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    let shaped = window
        .text_system()
        .shape_line(text.to_string().into(), px(style.size), &[run], None);
    let line_height = shaped.ascent + shaped.descent;
    let _ = shaped.paint(point(px(position.x), px(position.y)), line_height, window, cx);
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn to_bounds(rect: ScreenRect) -> Bounds<Pixels> {
    Bounds::from_corners(
        point(px(rect.min.x), px(rect.min.y)),
        point(px(rect.max.x), px(rect.max.y)),
    )
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}

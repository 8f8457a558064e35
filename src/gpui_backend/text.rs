use gpui::{TextRun, Window, font, px};

use crate::axis::TextMeasurer;

pub(crate) const UI_FONT: &str = ".SystemUIFont";

pub(crate) struct GpuiTextMeasurer<'a> {
    window: &'a Window,
}

impl<'a> GpuiTextMeasurer<'a> {
    pub(crate) fn new(window: &'a Window) -> Self {
        Self { window }
    }

    /// Size of a padded multi-line block, as used by the cursor readout.
    pub(crate) fn measure_block(&self, lines: &[String], size: f32) -> (f32, f32) {
        let (width, height) = lines.iter().fold((0.0_f32, 0.0_f32), |(w, h), line| {
            let (lw, lh) = self.measure(line, size);
            (w.max(lw), h + lh.max(size * 1.2))
        });
        (width + 8.0, height + 8.0)
    }
}

impl TextMeasurer for GpuiTextMeasurer<'_> {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let run = TextRun {
            len: text.len(),
            font: font(UI_FONT),
            color: gpui::black(),
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        let shaped =
            self.window
                .text_system()
                .shape_line(text.to_string().into(), px(size), &[run], None);
        let width = f32::from(shaped.width);
        let height = f32::from(shaped.ascent + shaped.descent);
        (width, height.max(size * 1.2))
    }
}

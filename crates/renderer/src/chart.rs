//! Minimal bar charts for snapshot statistics.
//!
//! No font is embedded, so charts carry bars, a baseline and grid lines
//! only. Labels are rendered by the browser next to the image.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::error::RenderResult;
use crate::png::{create_png_auto, PixelFormat};

const MARGIN: u32 = 32;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS: Rgba<u8> = Rgba([40, 40, 40, 255]);
const GRID: Rgba<u8> = Rgba([225, 225, 225, 255]);

#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub bar_color: (u8, u8, u8),
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 480,
            height: 320,
            bar_color: (59, 130, 246),
        }
    }
}

/// Draw one bar per entry. Missing values leave an empty slot.
pub fn render_bar_chart(entries: &[(String, Option<f64>)], style: &ChartStyle) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(style.width, style.height, BACKGROUND);

    let plot_left = MARGIN as f32;
    let plot_right = style.width.saturating_sub(MARGIN) as f32;
    let plot_top = MARGIN as f32;
    let plot_bottom = style.height.saturating_sub(MARGIN) as f32;
    let plot_h = (plot_bottom - plot_top).max(1.0);
    let plot_w = (plot_right - plot_left).max(1.0);

    for i in 0..=4 {
        let y = plot_top + plot_h * i as f32 / 4.0;
        draw_line_segment_mut(&mut img, (plot_left, y), (plot_right, y), GRID);
    }

    let finite: Vec<f64> = entries
        .iter()
        .filter_map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .collect();
    let max_pos = finite.iter().copied().fold(0.0, f64::max);
    let min_neg = finite.iter().copied().fold(0.0, f64::min);
    let range = if max_pos - min_neg > 0.0 {
        max_pos - min_neg
    } else {
        1.0
    };
    let baseline = plot_top + plot_h * (max_pos / range) as f32;

    if !entries.is_empty() {
        let slot = plot_w / entries.len() as f32;
        let bar_w = (slot * 0.6).max(1.0);
        let (r, g, b) = style.bar_color;
        let color = Rgba([r, g, b, 255]);

        for (i, (_, value)) in entries.iter().enumerate() {
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            let bar_h = (value.abs() / range) as f32 * plot_h;
            if bar_h < 1.0 {
                continue;
            }
            let x = plot_left + slot * i as f32 + (slot - bar_w) / 2.0;
            let y = if value >= 0.0 { baseline - bar_h } else { baseline };
            let rect = Rect::at(x.round() as i32, y.round() as i32)
                .of_size(bar_w.round() as u32, bar_h.round() as u32);
            draw_filled_rect_mut(&mut img, rect, color);
        }
    }

    draw_line_segment_mut(&mut img, (plot_left, plot_top), (plot_left, plot_bottom), AXIS);
    draw_line_segment_mut(&mut img, (plot_left, baseline), (plot_right, baseline), AXIS);

    img
}

/// Render and PNG-encode a bar chart.
pub fn bar_chart_png(entries: &[(String, Option<f64>)], style: &ChartStyle) -> RenderResult<Vec<u8>> {
    let img = render_bar_chart(entries, style);
    create_png_auto(
        img.as_raw(),
        style.width as usize,
        style.height as usize,
        PixelFormat::Rgba,
    )
}

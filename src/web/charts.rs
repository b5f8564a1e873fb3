//! Canvas-based charting for moodcam_web.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::ui_model::{EmotionLabel, Theme};

const DATASET_FILL: &str = "rgba(100, 216, 134, 0.2)";
const DATASET_BORDER: &str = "rgba(100, 216, 134, 0.8)";

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "get_context failed")?
        .ok_or("no 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "cast failed".to_string())
}

/// Draw the seven-axis emotion radar: concentric grid rings, one spoke and
/// axis label per emotion, and a single filled dataset in canonical label
/// order. Values are plotted on a 0..1 scale; drawing clamps to the plot
/// area, the bars elsewhere stay unclamped.
pub(super) fn draw_emotion_radar(
    canvas: &HtmlCanvasElement,
    values: &[f32; 7],
    theme: Theme,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;

    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let cx = w / 2.0;
    let cy = h / 2.0;
    let radius = (w.min(h) / 2.0) - 30.0;

    let (bg, grid, label_color) = match theme {
        Theme::Dark => ("#252525", "rgba(255, 255, 255, 0.08)", "#A0A0A0"),
        Theme::Light => ("#ffffff", "rgba(0, 0, 0, 0.08)", "#666666"),
    };

    ctx.set_fill_style_str(bg);
    ctx.fill_rect(0.0, 0.0, w, h);

    let n = EmotionLabel::all().len();
    let angle = |i: usize| {
        (i as f64) * std::f64::consts::TAU / (n as f64) - std::f64::consts::FRAC_PI_2
    };

    // Grid rings at 0.2 steps.
    ctx.set_stroke_style_str(grid);
    ctx.set_line_width(1.0);
    for ring in 1..=5 {
        let r = radius * (ring as f64) / 5.0;
        ctx.begin_path();
        for i in 0..=n {
            let a = angle(i % n);
            let x = cx + r * a.cos();
            let y = cy + r * a.sin();
            if i == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();
    }

    // Spokes and axis labels.
    ctx.set_font("12px system-ui, sans-serif");
    ctx.set_text_align("center");
    for (i, label) in EmotionLabel::all().iter().enumerate() {
        let a = angle(i);
        ctx.begin_path();
        ctx.move_to(cx, cy);
        ctx.line_to(cx + radius * a.cos(), cy + radius * a.sin());
        ctx.stroke();

        ctx.set_fill_style_str(label_color);
        let lx = cx + (radius + 18.0) * a.cos();
        let ly = cy + (radius + 18.0) * a.sin() + 4.0;
        let _ = ctx.fill_text(label.display_name(), lx, ly);
    }

    // Dataset polygon.
    ctx.set_fill_style_str(DATASET_FILL);
    ctx.set_stroke_style_str(DATASET_BORDER);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for i in 0..n {
        let v = (values[i] as f64).clamp(0.0, 1.0);
        let a = angle(i);
        let x = cx + radius * v * a.cos();
        let y = cy + radius * v * a.sin();
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.close_path();
    ctx.fill();
    ctx.stroke();

    // Point markers, one color per emotion.
    for (i, label) in EmotionLabel::all().iter().enumerate() {
        let v = (values[i] as f64).clamp(0.0, 1.0);
        let a = angle(i);
        let x = cx + radius * v * a.cos();
        let y = cy + radius * v * a.sin();

        ctx.set_fill_style_str(label.color());
        ctx.begin_path();
        ctx.arc(x, y, 3.0, 0.0, std::f64::consts::TAU).ok();
        ctx.fill();
    }

    Ok(())
}

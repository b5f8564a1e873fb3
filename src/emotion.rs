//! Emotion display reconciler.
//!
//! Pure: given the frame the backend reported, produce the full set of widget
//! values in one struct. The wasm layer applies a `DisplayUpdate` atomically,
//! so the bars, badge, label and chart never disagree about which frame they
//! show.

use crate::ui_model::EmotionLabel;

/// How long the pulse marker class stays on the dominant label/badge after
/// the dominant emotion changes.
pub const PULSE_MS: u32 = 700;

/// Placeholder text shown when the stream is not active.
pub const STOPPED_LABEL: &str = "Stream Stopped";

/// One poll tick's worth of data: seven confidences in canonical label order
/// plus the server-chosen dominant label. Replaced wholesale each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionFrame {
    pub confidences: [f32; 7],
    /// Trusted as-is from the backend, never recomputed client-side. Kept as
    /// a raw string so labels outside the closed set pass through unchanged.
    pub dominant: String,
}

impl EmotionFrame {
    /// Build a frame from wire pairs. Labels missing from the record are an
    /// implicit 0; labels outside the closed set are ignored. Confidence
    /// values are not clamped or validated.
    pub fn from_pairs<'a, I>(pairs: I, dominant: &str) -> EmotionFrame
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut confidences = [0.0f32; 7];
        for (name, value) in pairs {
            if let Some(label) = EmotionLabel::parse(name) {
                confidences[label as usize] = value;
            }
        }
        EmotionFrame {
            confidences,
            dominant: dominant.to_string(),
        }
    }

    pub fn confidence(&self, label: EmotionLabel) -> f32 {
        self.confidences[label as usize]
    }
}

/// Everything the emotion widgets display, derived from a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUpdate {
    /// Capitalized dominant label, or the stopped placeholder.
    pub dominant_display: String,
    /// Lowercase badge text.
    pub badge_text: String,
    /// Full badge class list, e.g. `emotion-badge emotion-happy`.
    pub badge_class: String,
    /// Percent per label in canonical order; drives bar width and text.
    pub bar_percent: [i32; 7],
    /// Chart dataset in canonical order.
    pub chart: [f32; 7],
    /// True when the dominant label changed relative to the previous update.
    pub pulse: bool,
}

impl DisplayUpdate {
    pub fn bar_text(&self, label: EmotionLabel) -> String {
        format!("{}%", self.bar_percent[label as usize])
    }

    pub fn bar_width(&self, label: EmotionLabel) -> String {
        format!("width: {}%;", self.bar_percent[label as usize])
    }
}

pub fn percent(confidence: f32) -> i32 {
    (confidence * 100.0).round() as i32
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Map a frame onto widget values. `previous_dominant` is the dominant text
/// currently displayed (lowercase wire form); the pulse flag is the only
/// comparative behavior here.
pub fn reconcile(frame: &EmotionFrame, previous_dominant: Option<&str>) -> DisplayUpdate {
    let mut bar_percent = [0i32; 7];
    for label in EmotionLabel::all() {
        bar_percent[*label as usize] = percent(frame.confidence(*label));
    }

    DisplayUpdate {
        dominant_display: capitalize(&frame.dominant),
        badge_text: frame.dominant.clone(),
        badge_class: format!("emotion-badge emotion-{}", frame.dominant),
        bar_percent,
        chart: frame.confidences,
        pulse: previous_dominant != Some(frame.dominant.as_str()),
    }
}

/// The "Stream Stopped" placeholder: all bars at 0%, chart zeroed, no badge
/// emotion class and no pulse.
pub fn stopped() -> DisplayUpdate {
    DisplayUpdate {
        dominant_display: STOPPED_LABEL.to_string(),
        badge_text: String::from("--"),
        badge_class: String::from("emotion-badge"),
        bar_percent: [0; 7],
        chart: [0.0; 7],
        pulse: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> EmotionFrame {
        EmotionFrame::from_pairs(
            [
                ("angry", 0.05),
                ("disgust", 0.0),
                ("fear", 0.02),
                ("happy", 0.81),
                ("neutral", 0.1),
                ("sad", 0.01),
                ("surprise", 0.01),
            ],
            "happy",
        )
    }

    #[test]
    fn bars_round_to_whole_percent() {
        let update = reconcile(&full_frame(), Some("happy"));
        assert_eq!(update.bar_percent[EmotionLabel::Angry as usize], 5);
        assert_eq!(update.bar_percent[EmotionLabel::Fear as usize], 2);
        assert_eq!(update.bar_percent[EmotionLabel::Happy as usize], 81);
        assert_eq!(update.bar_text(EmotionLabel::Happy), "81%");
        assert_eq!(update.bar_width(EmotionLabel::Happy), "width: 81%;");

        // Rounding, not truncation.
        assert_eq!(percent(0.005), 1);
        assert_eq!(percent(0.004), 0);
    }

    #[test]
    fn sparse_record_treats_missing_labels_as_zero() {
        let frame = EmotionFrame::from_pairs([("happy", 0.81), ("neutral", 0.1)], "happy");
        let update = reconcile(&frame, None);

        assert_eq!(update.bar_text(EmotionLabel::Happy), "81%");
        for label in [
            EmotionLabel::Angry,
            EmotionLabel::Disgust,
            EmotionLabel::Fear,
            EmotionLabel::Sad,
            EmotionLabel::Surprise,
        ] {
            assert_eq!(update.bar_text(label), "0%");
        }
        assert_eq!(update.chart, [0.0, 0.0, 0.0, 0.81, 0.1, 0.0, 0.0]);
    }

    #[test]
    fn unknown_wire_labels_are_ignored() {
        let frame = EmotionFrame::from_pairs([("bored", 0.9), ("happy", 0.3)], "happy");
        assert_eq!(frame.confidence(EmotionLabel::Happy), 0.3);
        assert_eq!(frame.confidences, [0.0, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn pulse_only_when_dominant_changes() {
        let frame = full_frame();
        assert!(!reconcile(&frame, Some("happy")).pulse);
        assert!(reconcile(&frame, Some("neutral")).pulse);
        assert!(reconcile(&frame, None).pulse);
    }

    #[test]
    fn dominant_text_and_badge_class() {
        let update = reconcile(&full_frame(), Some("happy"));
        assert_eq!(update.dominant_display, "Happy");
        assert_eq!(update.badge_text, "happy");
        assert_eq!(update.badge_class, "emotion-badge emotion-happy");
    }

    #[test]
    fn out_of_set_dominant_passes_through() {
        // The source never validated the dominant label; neither do we.
        let frame = EmotionFrame::from_pairs([("happy", 0.5)], "confused");
        let update = reconcile(&frame, Some("happy"));
        assert_eq!(update.dominant_display, "Confused");
        assert_eq!(update.badge_class, "emotion-badge emotion-confused");
        assert!(update.pulse);
    }

    #[test]
    fn confidences_are_not_clamped() {
        let frame = EmotionFrame::from_pairs([("happy", 1.5), ("sad", -0.2)], "happy");
        let update = reconcile(&frame, None);
        assert_eq!(update.bar_text(EmotionLabel::Happy), "150%");
        assert_eq!(update.bar_text(EmotionLabel::Sad), "-20%");
    }

    #[test]
    fn stopped_placeholder_resets_everything() {
        let update = stopped();
        assert_eq!(update.dominant_display, "Stream Stopped");
        for label in EmotionLabel::all() {
            assert_eq!(update.bar_text(*label), "0%");
        }
        assert_eq!(update.chart, [0.0; 7]);
        assert_eq!(update.badge_class, "emotion-badge");
        assert!(!update.pulse);
    }
}

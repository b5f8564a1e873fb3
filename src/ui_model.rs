//! UI models and metadata that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! emotion vocabulary and theme handling on the host.

/// The closed set of emotion labels the backend reports, in the canonical
/// order used by the progress bars and the radar chart dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl EmotionLabel {
    /// Lowercase wire label, as the API and the CSS hooks spell it.
    pub fn label(self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EmotionLabel::Angry => "Angry",
            EmotionLabel::Disgust => "Disgust",
            EmotionLabel::Fear => "Fear",
            EmotionLabel::Happy => "Happy",
            EmotionLabel::Neutral => "Neutral",
            EmotionLabel::Sad => "Sad",
            EmotionLabel::Surprise => "Surprise",
        }
    }

    /// Marker color for the chart point and the progress bar fill.
    pub fn color(self) -> &'static str {
        match self {
            EmotionLabel::Angry => "#f44336",
            EmotionLabel::Disgust => "#ff9800",
            EmotionLabel::Fear => "#ffeb3b",
            EmotionLabel::Happy => "#4CAF50",
            EmotionLabel::Neutral => "#9e9e9e",
            EmotionLabel::Sad => "#2196F3",
            EmotionLabel::Surprise => "#9c27b0",
        }
    }

    pub fn parse(s: &str) -> Option<EmotionLabel> {
        EmotionLabel::all()
            .iter()
            .copied()
            .find(|l| l.label() == s)
    }

    pub fn all() -> &'static [EmotionLabel; 7] {
        &[
            EmotionLabel::Angry,
            EmotionLabel::Disgust,
            EmotionLabel::Fear,
            EmotionLabel::Happy,
            EmotionLabel::Neutral,
            EmotionLabel::Sad,
            EmotionLabel::Surprise,
        ]
    }
}

/// Light/dark preference, persisted in localStorage independently of any
/// stream state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "☀",
            Theme::Dark => "🌙",
        }
    }

    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Unknown or absent stored values fall back to dark.
    pub fn from_stored(s: Option<&str>) -> Theme {
        match s.map(str::trim) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    /// CSS custom properties for this variant, written onto the document
    /// element when the theme is applied.
    pub fn palette(self) -> [(&'static str, &'static str); 7] {
        match self {
            Theme::Light => [
                ("--background-color", "#f5f5f5"),
                ("--surface-color", "#ffffff"),
                ("--card-color", "#ffffff"),
                ("--text-color", "#333333"),
                ("--text-light", "#666666"),
                ("--border-color", "#e0e0e0"),
                ("--border-color-light", "#eeeeee"),
            ],
            Theme::Dark => [
                ("--background-color", "#121212"),
                ("--surface-color", "#1E1E1E"),
                ("--card-color", "#252525"),
                ("--text-color", "#E4E4E4"),
                ("--text-light", "#A0A0A0"),
                ("--border-color", "#333333"),
                ("--border-color-light", "#444444"),
            ],
        }
    }

    /// Body class for this variant; exactly one of the two is present at a time.
    pub fn body_class(self) -> &'static str {
        match self {
            Theme::Light => "light-theme",
            Theme::Dark => "dark-theme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

impl ToastLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastLevel::Success => "notification success",
            ToastLevel::Error => "notification error",
        }
    }
}

/// A transient notification. At most one is alive at a time; a newer toast
/// supersedes the current one, and stale dismiss timers are recognized by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    /// Drives the CSS `show` class; toggled shortly after insertion so the
    /// enter transition can fire, and off again for the fade-out.
    pub visible: bool,
}

/// Delay before the `show` class is added to a freshly inserted notification.
pub const TOAST_SHOW_DELAY_MS: u32 = 10;
/// How long a notification stays visible.
pub const TOAST_VISIBLE_MS: u32 = 3000;
/// Fade-out duration before the element is removed.
pub const TOAST_FADE_MS: u32 = 300;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_inventory_is_stable() {
        let all = EmotionLabel::all();
        assert_eq!(all.len(), 7);

        let mut labels: Vec<&'static str> = all.iter().copied().map(EmotionLabel::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 7);

        // Canonical order matters: it is the chart dataset order.
        assert_eq!(all[0], EmotionLabel::Angry);
        assert_eq!(all[3], EmotionLabel::Happy);
        assert_eq!(all[6], EmotionLabel::Surprise);

        for l in all {
            assert_eq!(EmotionLabel::parse(l.label()), Some(*l));
            assert!(!l.display_name().trim().is_empty());
            assert!(l.color().starts_with('#'));
        }
        assert_eq!(EmotionLabel::parse("bored"), None);
    }

    #[test]
    fn theme_round_trips_through_storage_string() {
        assert_eq!(Theme::from_stored(Some(Theme::Light.label())), Theme::Light);
        assert_eq!(Theme::from_stored(Some(Theme::Dark.label())), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("mauve")), Theme::Dark);
        assert_eq!(Theme::from_stored(None), Theme::Dark);
    }

    #[test]
    fn theme_palettes_cover_the_same_variables() {
        let light = Theme::Light.palette();
        let dark = Theme::Dark.palette();
        for ((lk, _), (dk, _)) in light.iter().zip(dark.iter()) {
            assert_eq!(lk, dk);
        }
        assert_ne!(Theme::Light.body_class(), Theme::Dark.body_class());
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
    }
}

//! Video-feed lifecycle controller and polling plumbing.
//!
//! The controller is a pure state machine: every user action or feed event
//! returns the list of [`FeedEffect`]s the caller must execute. The wasm
//! layer owns the actual `<img>` element, timers and notifications; the
//! transition rules (reconnect budget, backoff delays, what a refresh resets)
//! all live here where they can be tested on the host.

use crate::ui_model::ToastLevel;

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_DELAY_MS: u32 = 2000;
pub const REFRESH_DELAY_MS: u32 = 1000;

/// Emotion poll cadence while the stream is active and the tab is visible.
pub const EMOTION_POLL_MS: u32 = 300;
/// Performance-metrics poll cadence while the stream is active.
pub const PERF_POLL_MS: u32 = 2000;

pub const VIDEO_FEED_ENDPOINT: &str = "/api/video_feed";

pub const MSG_FEED_FAILED: &str = "Could not connect to video feed. Please refresh the page.";
pub const MSG_FEED_REFRESHED: &str = "Video feed refreshed";
pub const MSG_PERMISSION_DENIED: &str = "Camera permission denied. Please enable camera access.";
pub const MSG_PERMISSION_REQUIRED: &str = "Camera access is required for emotion recognition.";
pub const MSG_UNSUPPORTED: &str = "Your browser does not support camera access.";
pub const MSG_SNAPSHOT_SAVED: &str = "Snapshot saved!";
pub const MSG_STREAM_NOT_ACTIVE: &str = "Video stream is not active";

/// Feed source with a cache-busting timestamp query parameter.
pub fn feed_url(timestamp_ms: u64) -> String {
    format!("{VIDEO_FEED_ENDPOINT}?t={timestamp_ms}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    Uninitialized,
    RequestingPermission,
    Active,
    /// A re-init is scheduled (automatic backoff or a pending manual refresh).
    Reconnecting,
    Inactive,
}

/// What the browser layer must do after a controller transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEffect {
    /// Point the feed element at a fresh cache-busted feed URL.
    SetSource,
    /// Clear the feed element's source.
    ClearSource,
    /// Start the emotion and performance polling loops.
    StartPolling,
    /// Stop both polling loops.
    StopPolling,
    /// Reset all emotion widgets and metric texts to their stopped placeholders.
    ResetDisplays,
    /// Call [`FeedController::retry_due`] after the delay.
    RetryInit { delay_ms: u32 },
    Notify {
        message: &'static str,
        level: ToastLevel,
    },
}

/// Camera permission as reported by the Permissions API at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Prompt,
    Denied,
}

impl PermissionDecision {
    pub fn from_state(state: &str) -> PermissionDecision {
        match state {
            "granted" => PermissionDecision::Granted,
            "prompt" => PermissionDecision::Prompt,
            _ => PermissionDecision::Denied,
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedController {
    phase: FeedPhase,
    reconnect_attempts: u32,
    refresh_pending: bool,
}

impl FeedController {
    pub fn new() -> FeedController {
        FeedController::default()
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == FeedPhase::Active
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Whether a poll tick should actually fetch. Visibility gates the fetch
    /// body only; the timers themselves keep running.
    pub fn should_poll(&self, document_visible: bool) -> bool {
        document_visible && self.is_active()
    }

    /// Startup routing from the Permissions API pre-check.
    pub fn startup(&mut self, decision: PermissionDecision) -> Vec<FeedEffect> {
        match decision {
            PermissionDecision::Granted => self.begin(),
            PermissionDecision::Prompt => {
                self.phase = FeedPhase::RequestingPermission;
                Vec::new()
            }
            PermissionDecision::Denied => {
                self.phase = FeedPhase::RequestingPermission;
                vec![FeedEffect::Notify {
                    message: MSG_PERMISSION_REQUIRED,
                    level: ToastLevel::Error,
                }]
            }
        }
    }

    /// getUserMedia resolved; the acquired tracks are already released by the
    /// caller (video is sourced from the server, not the local camera).
    pub fn permission_granted(&mut self) -> Vec<FeedEffect> {
        self.begin()
    }

    pub fn permission_denied(&mut self) -> Vec<FeedEffect> {
        self.phase = FeedPhase::RequestingPermission;
        vec![FeedEffect::Notify {
            message: MSG_PERMISSION_DENIED,
            level: ToastLevel::Error,
        }]
    }

    pub fn environment_unsupported(&mut self) -> Vec<FeedEffect> {
        self.phase = FeedPhase::Inactive;
        vec![FeedEffect::Notify {
            message: MSG_UNSUPPORTED,
            level: ToastLevel::Error,
        }]
    }

    /// Initialize (or re-initialize) the feed element. Polling starts only
    /// once the element reports a successful load.
    pub fn begin(&mut self) -> Vec<FeedEffect> {
        self.phase = FeedPhase::Active;
        vec![FeedEffect::SetSource]
    }

    pub fn load_succeeded(&mut self) -> Vec<FeedEffect> {
        if self.phase != FeedPhase::Active {
            // Load event raced a stop; the source is already cleared.
            return Vec::new();
        }
        self.reconnect_attempts = 0;
        vec![FeedEffect::StartPolling]
    }

    pub fn load_failed(&mut self) -> Vec<FeedEffect> {
        // Clearing the source on stop fires a spurious error event; only an
        // active or reconnecting feed gets the retry treatment.
        if !matches!(self.phase, FeedPhase::Active | FeedPhase::Reconnecting) {
            return Vec::new();
        }
        self.reconnect_attempts += 1;
        if self.reconnect_attempts < MAX_RECONNECT_ATTEMPTS {
            self.phase = FeedPhase::Reconnecting;
            vec![FeedEffect::RetryInit {
                delay_ms: RECONNECT_DELAY_MS,
            }]
        } else {
            self.phase = FeedPhase::Inactive;
            vec![
                FeedEffect::Notify {
                    message: MSG_FEED_FAILED,
                    level: ToastLevel::Error,
                },
                FeedEffect::StopPolling,
                FeedEffect::ResetDisplays,
            ]
        }
    }

    /// User-triggered recovery: tear down, then re-init after a short delay
    /// with the reconnect budget restored.
    pub fn refresh(&mut self) -> Vec<FeedEffect> {
        self.reconnect_attempts = 0;
        self.refresh_pending = true;
        self.phase = FeedPhase::Reconnecting;
        vec![
            FeedEffect::ClearSource,
            FeedEffect::StopPolling,
            FeedEffect::ResetDisplays,
            FeedEffect::RetryInit {
                delay_ms: REFRESH_DELAY_MS,
            },
        ]
    }

    pub fn stop(&mut self) -> Vec<FeedEffect> {
        self.phase = FeedPhase::Inactive;
        self.refresh_pending = false;
        vec![
            FeedEffect::ClearSource,
            FeedEffect::StopPolling,
            FeedEffect::ResetDisplays,
        ]
    }

    /// A scheduled [`FeedEffect::RetryInit`] timer fired. A stop issued while
    /// the timer was pending cancels the re-init.
    pub fn retry_due(&mut self) -> Vec<FeedEffect> {
        if self.phase != FeedPhase::Reconnecting {
            self.refresh_pending = false;
            return Vec::new();
        }
        let mut effects = self.begin();
        if std::mem::take(&mut self.refresh_pending) {
            effects.push(FeedEffect::Notify {
                message: MSG_FEED_REFRESHED,
                level: ToastLevel::Success,
            });
        }
        effects
    }
}

/// Monotonic sequence numbers for in-flight emotion fetches. Completions are
/// applied only if they are the latest issued, so an overlapping slow
/// response can never overwrite a fresher frame.
#[derive(Debug, Default)]
pub struct SequenceGate {
    issued: u64,
}

impl SequenceGate {
    pub fn new() -> SequenceGate {
        SequenceGate::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifications(effects: &[FeedEffect]) -> Vec<&'static str> {
        effects
            .iter()
            .filter_map(|e| match e {
                FeedEffect::Notify { message, .. } => Some(*message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn feed_url_carries_cache_buster() {
        assert_eq!(feed_url(1234), "/api/video_feed?t=1234");
    }

    #[test]
    fn load_success_resets_attempts_and_starts_polling() {
        let mut c = FeedController::new();
        c.begin();
        c.load_failed();
        assert_eq!(c.reconnect_attempts(), 1);

        let effects = c.retry_due();
        assert_eq!(effects, vec![FeedEffect::SetSource]);
        let effects = c.load_succeeded();
        assert_eq!(effects, vec![FeedEffect::StartPolling]);
        assert_eq!(c.reconnect_attempts(), 0);
        assert!(c.is_active());
    }

    #[test]
    fn four_failures_retry_silently_at_fixed_backoff() {
        let mut c = FeedController::new();
        c.begin();
        for attempt in 1..=4 {
            let effects = c.load_failed();
            assert_eq!(
                effects,
                vec![FeedEffect::RetryInit {
                    delay_ms: RECONNECT_DELAY_MS
                }],
                "attempt {attempt}"
            );
            assert_eq!(c.phase(), FeedPhase::Reconnecting);
            assert_eq!(c.reconnect_attempts(), attempt);
            c.retry_due();
        }
        assert!(c.is_active());
    }

    #[test]
    fn fifth_failure_notifies_once_and_goes_inactive() {
        let mut c = FeedController::new();
        c.begin();
        let mut all_notifications = Vec::new();
        for _ in 1..=4 {
            all_notifications.extend(notifications(&c.load_failed()));
            c.retry_due();
        }
        let final_effects = c.load_failed();
        all_notifications.extend(notifications(&final_effects));

        assert_eq!(all_notifications, vec![MSG_FEED_FAILED]);
        assert_eq!(c.phase(), FeedPhase::Inactive);
        assert!(final_effects.contains(&FeedEffect::StopPolling));
        assert!(final_effects.contains(&FeedEffect::ResetDisplays));

        // Exhausted: a further error event does nothing.
        assert!(c.load_failed().is_empty());
    }

    #[test]
    fn refresh_always_resets_the_reconnect_counter() {
        for prior_failures in [0u32, 1, 3, 4] {
            let mut c = FeedController::new();
            c.begin();
            for _ in 0..prior_failures {
                c.load_failed();
                c.retry_due();
            }
            let effects = c.refresh();
            assert_eq!(c.reconnect_attempts(), 0);
            assert!(effects.contains(&FeedEffect::RetryInit {
                delay_ms: REFRESH_DELAY_MS
            }));
            assert!(effects.contains(&FeedEffect::ClearSource));
            assert!(effects.contains(&FeedEffect::ResetDisplays));

            let effects = c.retry_due();
            assert_eq!(notifications(&effects), vec![MSG_FEED_REFRESHED]);
            assert!(c.is_active());
        }
    }

    #[test]
    fn stop_cancels_a_pending_retry() {
        let mut c = FeedController::new();
        c.begin();
        c.load_failed();
        assert_eq!(c.phase(), FeedPhase::Reconnecting);

        let effects = c.stop();
        assert_eq!(
            effects,
            vec![
                FeedEffect::ClearSource,
                FeedEffect::StopPolling,
                FeedEffect::ResetDisplays,
            ]
        );
        assert!(c.retry_due().is_empty());
        assert_eq!(c.phase(), FeedPhase::Inactive);

        // The error event fired by clearing the source is ignored.
        assert!(c.load_failed().is_empty());
    }

    #[test]
    fn startup_routes_on_permission_state() {
        let mut c = FeedController::new();
        assert_eq!(
            c.startup(PermissionDecision::Granted),
            vec![FeedEffect::SetSource]
        );
        assert!(c.is_active());

        let mut c = FeedController::new();
        assert!(c.startup(PermissionDecision::Prompt).is_empty());
        assert_eq!(c.phase(), FeedPhase::RequestingPermission);

        let mut c = FeedController::new();
        let effects = c.startup(PermissionDecision::Denied);
        assert_eq!(notifications(&effects), vec![MSG_PERMISSION_REQUIRED]);
        assert_eq!(c.phase(), FeedPhase::RequestingPermission);

        assert_eq!(
            PermissionDecision::from_state("granted"),
            PermissionDecision::Granted
        );
        assert_eq!(
            PermissionDecision::from_state("prompt"),
            PermissionDecision::Prompt
        );
        assert_eq!(
            PermissionDecision::from_state("denied"),
            PermissionDecision::Denied
        );
    }

    #[test]
    fn polling_is_gated_on_visibility_and_activity() {
        let mut c = FeedController::new();
        assert!(!c.should_poll(true));
        c.begin();
        assert!(c.should_poll(true));
        assert!(!c.should_poll(false));
        c.stop();
        assert!(!c.should_poll(true));
    }

    #[test]
    fn sequence_gate_discards_stale_completions() {
        let mut gate = SequenceGate::new();
        let first = gate.issue();
        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));

        let third = gate.issue();
        assert!(gate.is_current(third));
        assert!(!gate.is_current(second));
    }
}

//! The browser app: video feed lifecycle, polling loops and emotion widgets.
//!
//! All state transitions go through the pure [`FeedController`]; this module
//! only executes the effects it emits against the DOM, the timers and the
//! notification surface.

mod api;
mod charts;
mod shell;
mod storage;
mod video;

use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::console;

use crate::emotion::{self, DisplayUpdate, EmotionFrame, PULSE_MS};
use crate::stream::{
    self, FeedController, FeedEffect, FeedPhase, SequenceGate, EMOTION_POLL_MS, PERF_POLL_MS,
};
use crate::ui_model::{
    EmotionLabel, Theme, Toast, ToastLevel, TOAST_FADE_MS, TOAST_SHOW_DELAY_MS, TOAST_VISIBLE_MS,
};

use shell::{NotificationView, PermissionPanel, Topbar};

pub fn start() {
    mount_to_body(|| view! { <App /> });
}

fn log(msg: &str) {
    console::log_1(&msg.into());
}

fn warn(msg: &str) {
    console::warn_1(&msg.into());
}

fn set_timeout(delay_ms: u32, f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms as i32)
        .is_err()
    {
        warn("failed to schedule timeout");
    }
}

fn now_ms() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn document_visible() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .map(|d| d.visibility_state() == web_sys::VisibilityState::Visible)
        .unwrap_or(true)
}

/// Everything the effect executor needs, bundled so timer and fetch closures
/// can capture one `Copy` handle.
#[derive(Clone, Copy)]
struct AppContext {
    controller: StoredValue<FeedController>,
    gate: StoredValue<SequenceGate>,
    last_dominant: StoredValue<Option<String>>,
    toast_seq: StoredValue<u64>,
    pulse_seq: StoredValue<u64>,
    display: RwSignal<DisplayUpdate>,
    pulse: RwSignal<bool>,
    fps_text: RwSignal<String>,
    inference_text: RwSignal<String>,
    toast: RwSignal<Option<Toast>>,
    theme: RwSignal<Theme>,
    phase: RwSignal<FeedPhase>,
    permission_visible: RwSignal<bool>,
    feed_src: RwSignal<String>,
    emotion_interval: RwSignal<Option<i32>>,
    perf_interval: RwSignal<Option<i32>>,
    canvas: NodeRef<html::Canvas>,
}

impl AppContext {
    fn new() -> AppContext {
        AppContext {
            controller: StoredValue::new(FeedController::new()),
            gate: StoredValue::new(SequenceGate::new()),
            last_dominant: StoredValue::new(None),
            toast_seq: StoredValue::new(0),
            pulse_seq: StoredValue::new(0),
            display: RwSignal::new(emotion::stopped()),
            pulse: RwSignal::new(false),
            fps_text: RwSignal::new(api::FPS_PLACEHOLDER.to_string()),
            inference_text: RwSignal::new(api::INFERENCE_PLACEHOLDER.to_string()),
            toast: RwSignal::new(None),
            theme: RwSignal::new(storage::load_theme()),
            phase: RwSignal::new(FeedPhase::Uninitialized),
            permission_visible: RwSignal::new(false),
            feed_src: RwSignal::new(String::new()),
            emotion_interval: RwSignal::new(None),
            perf_interval: RwSignal::new(None),
            canvas: NodeRef::new(),
        }
    }

    /// Run a controller transition and execute the effects it returns.
    fn dispatch(self, transition: impl FnOnce(&mut FeedController) -> Vec<FeedEffect>) {
        let mut effects = Vec::new();
        self.controller.update_value(|c| effects = transition(c));
        self.phase.set(self.controller.with_value(|c| c.phase()));
        self.apply_effects(effects);
    }

    fn apply_effects(self, effects: Vec<FeedEffect>) {
        for effect in effects {
            match effect {
                FeedEffect::SetSource => self.feed_src.set(stream::feed_url(now_ms())),
                FeedEffect::ClearSource => self.feed_src.set(String::new()),
                FeedEffect::StartPolling => self.start_polling(),
                FeedEffect::StopPolling => self.stop_polling(),
                FeedEffect::ResetDisplays => self.reset_displays(),
                FeedEffect::RetryInit { delay_ms } => {
                    set_timeout(delay_ms, move || self.dispatch(FeedController::retry_due));
                }
                FeedEffect::Notify { message, level } => self.notify(message.to_string(), level),
            }
        }
    }

    fn notify(self, message: String, level: ToastLevel) {
        let mut id = 0;
        self.toast_seq.update_value(|n| {
            *n += 1;
            id = *n;
        });
        self.toast.set(Some(Toast {
            id,
            message,
            level,
            visible: false,
        }));

        let toast = self.toast;
        set_timeout(TOAST_SHOW_DELAY_MS, move || {
            toast.update(|t| {
                if let Some(t) = t {
                    if t.id == id {
                        t.visible = true;
                    }
                }
            });
        });
        set_timeout(TOAST_SHOW_DELAY_MS + TOAST_VISIBLE_MS, move || {
            toast.update(|t| {
                if let Some(t) = t {
                    if t.id == id {
                        t.visible = false;
                    }
                }
            });
        });
        // Stale removal timers from a superseded toast must not take down a
        // newer one, hence the id check.
        set_timeout(
            TOAST_SHOW_DELAY_MS + TOAST_VISIBLE_MS + TOAST_FADE_MS,
            move || {
                toast.update(|t| {
                    if t.as_ref().is_some_and(|t| t.id == id) {
                        *t = None;
                    }
                });
            },
        );
    }

    /// Apply one frame atomically: bars, badge, label, chart and pulse all
    /// come from the same `DisplayUpdate`.
    fn apply_frame(self, frame: EmotionFrame) {
        let previous = self.last_dominant.with_value(|d| d.clone());
        let update = emotion::reconcile(&frame, previous.as_deref());
        self.last_dominant.set_value(Some(frame.dominant));

        if update.pulse {
            let mut seq = 0;
            self.pulse_seq.update_value(|n| {
                *n += 1;
                seq = *n;
            });
            self.pulse.set(true);
            let pulse = self.pulse;
            let pulse_seq = self.pulse_seq;
            set_timeout(PULSE_MS, move || {
                if pulse_seq.with_value(|n| *n == seq) {
                    pulse.set(false);
                }
            });
        }

        self.display.set(update);
        self.redraw_chart();
    }

    fn reset_displays(self) {
        self.last_dominant.set_value(None);
        self.pulse.set(false);
        self.display.set(emotion::stopped());
        self.fps_text.set(api::FPS_PLACEHOLDER.to_string());
        self.inference_text.set(api::INFERENCE_PLACEHOLDER.to_string());
        self.redraw_chart();
    }

    fn redraw_chart(self) {
        let Some(canvas) = self.canvas.get_untracked() else {
            return;
        };
        let values = self.display.with_untracked(|d| d.chart);
        if let Err(e) = charts::draw_emotion_radar(&canvas, &values, self.theme.get_untracked()) {
            warn(&format!("chart redraw failed: {e}"));
        }
    }

    fn start_polling(self) {
        let Some(window) = web_sys::window() else {
            return;
        };

        if self.emotion_interval.get_untracked().is_none() {
            let cb = Closure::wrap(Box::new(move || self.emotion_tick()) as Box<dyn FnMut()>);
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                EMOTION_POLL_MS as i32,
            ) {
                Ok(id) => {
                    cb.forget();
                    self.emotion_interval.set(Some(id));
                }
                Err(_) => warn("failed to start emotion polling"),
            }
        }

        if self.perf_interval.get_untracked().is_none() {
            let cb = Closure::wrap(Box::new(move || self.perf_tick()) as Box<dyn FnMut()>);
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                PERF_POLL_MS as i32,
            ) {
                Ok(id) => {
                    cb.forget();
                    self.perf_interval.set(Some(id));
                }
                Err(_) => warn("failed to start performance polling"),
            }
        }
    }

    fn stop_polling(self) {
        if let Some(window) = web_sys::window() {
            if let Some(id) = self.emotion_interval.get_untracked() {
                window.clear_interval_with_handle(id);
            }
            if let Some(id) = self.perf_interval.get_untracked() {
                window.clear_interval_with_handle(id);
            }
        }
        self.emotion_interval.set(None);
        self.perf_interval.set(None);
    }

    /// One emotion poll tick. Visibility gates the fetch body, not the timer;
    /// the sequence gate discards completions that lost the race.
    fn emotion_tick(self) {
        if !self
            .controller
            .with_value(|c| c.should_poll(document_visible()))
        {
            return;
        }

        let mut seq = 0;
        self.gate.update_value(|g| seq = g.issue());

        spawn_local(async move {
            match api::fetch_current_emotion().await {
                Ok(payload) => {
                    if !self.gate.with_value(|g| g.is_current(seq)) {
                        return;
                    }
                    if !self.controller.with_value(|c| c.is_active()) {
                        return;
                    }
                    if let Some(err) = payload.error.as_deref() {
                        warn(&format!("emotion data warning: {err}"));
                    }
                    let frame = EmotionFrame::from_pairs(
                        payload.emotions.iter().map(|(k, v)| (k.as_str(), *v)),
                        &payload.dominant_emotion,
                    );
                    self.apply_frame(frame);
                }
                // Expected before the stream has produced its first frame.
                Err(e) => log(&format!("waiting for emotion data: {e}")),
            }
        });
    }

    fn perf_tick(self) {
        if !self.controller.with_value(|c| c.is_active()) {
            return;
        }

        spawn_local(async move {
            match api::fetch_performance().await {
                Ok(payload) => {
                    if let Some(err) = payload.error.as_deref() {
                        warn(&format!("performance metrics warning: {err}"));
                        return;
                    }
                    if !self.controller.with_value(|c| c.is_active()) {
                        return;
                    }
                    self.fps_text.set(payload.fps_text());
                    self.inference_text.set(payload.inference_text());
                }
                Err(e) => warn(&format!("performance metrics fetch failed: {e}")),
            }
        });
    }

    fn snapshot(self) {
        if !self.controller.with_value(|c| c.is_active()) {
            self.notify(stream::MSG_STREAM_NOT_ACTIVE.to_string(), ToastLevel::Error);
            return;
        }

        spawn_local(async move {
            match api::fetch_current_emotion().await {
                Ok(payload) => {
                    self.notify(stream::MSG_SNAPSHOT_SAVED.to_string(), ToastLevel::Success);
                    let frame = EmotionFrame::from_pairs(
                        payload.emotions.iter().map(|(k, v)| (k.as_str(), *v)),
                        &payload.dominant_emotion,
                    );
                    self.apply_frame(frame);
                }
                Err(e) => self.notify(
                    format!("Unable to save snapshot: {e}"),
                    ToastLevel::Error,
                ),
            }
        });
    }

    fn request_permission(self) {
        spawn_local(async move {
            match video::request_camera_permission().await {
                Ok(()) => {
                    self.permission_visible.set(false);
                    self.dispatch(FeedController::permission_granted);
                }
                Err(e) => {
                    warn(&format!("camera permission request failed: {e}"));
                    self.dispatch(FeedController::permission_denied);
                }
            }
        });
    }

    /// Startup routing: capability check, then the Permissions API pre-check.
    fn startup(self) {
        if !video::media_devices_supported() {
            self.dispatch(FeedController::environment_unsupported);
            return;
        }

        spawn_local(async move {
            match video::query_camera_permission().await {
                Some(decision) => {
                    self.permission_visible
                        .set(decision != stream::PermissionDecision::Granted);
                    self.dispatch(|c| c.startup(decision));
                }
                None => {
                    // Permission state unknown; try the feed anyway.
                    log("camera permission query unavailable; starting feed");
                    self.dispatch(FeedController::begin);
                }
            }
        });
    }
}

#[component]
fn App() -> impl IntoView {
    let ctx = AppContext::new();

    // Apply and persist the theme on every change, including the initial one,
    // before anything else paints.
    Effect::new(move |_| {
        let theme = ctx.theme.get();
        storage::apply_theme_to_document(theme);
        storage::save_theme(theme);
        ctx.redraw_chart();
    });

    // First draw once the canvas is mounted.
    Effect::new(move |_| {
        if ctx.canvas.get().is_some() {
            ctx.redraw_chart();
        }
    });

    ctx.startup();

    on_cleanup(move || ctx.stop_polling());

    let display = ctx.display;
    let pulse = ctx.pulse;
    let label_class = move || {
        if pulse.get() {
            "dominant-label pulse"
        } else {
            "dominant-label"
        }
    };
    let badge_class = move || {
        let base = display.with(|d| d.badge_class.clone());
        if pulse.get() {
            format!("{base} pulse")
        } else {
            base
        }
    };

    let feed_src = ctx.feed_src;

    view! {
        <main class="app">
            <Topbar phase=ctx.phase.read_only() theme=ctx.theme />
            <NotificationView toast=ctx.toast.read_only() />

            <section class="video-panel">
                <PermissionPanel
                    visible=ctx.permission_visible.read_only()
                    request=Callback::new(move |_| ctx.request_permission())
                />
                // Unmounting the element on ClearSource avoids the spurious
                // error event an emptied src attribute would fire.
                <Show when=move || !feed_src.get().is_empty()>
                    <img
                        id="video-feed"
                        alt="Live video feed"
                        src=move || feed_src.get()
                        on:load=move |_| ctx.dispatch(FeedController::load_succeeded)
                        on:error=move |_| ctx.dispatch(FeedController::load_failed)
                    />
                </Show>
                <div class="video-controls">
                    <button class="btn" on:click=move |_| ctx.dispatch(FeedController::refresh)>
                        "Refresh"
                    </button>
                    <button class="btn" on:click=move |_| ctx.dispatch(FeedController::stop)>
                        "Stop"
                    </button>
                    <button class="btn" on:click=move |_| ctx.snapshot()>
                        "Snapshot"
                    </button>
                </div>
                <div class="metrics">
                    <span id="fps">{move || ctx.fps_text.get()}</span>
                    <span id="inference-time">{move || ctx.inference_text.get()}</span>
                </div>
            </section>

            <section class="emotion-panel">
                <div class="dominant">
                    <span id="dominant-emotion-label" class=label_class>
                        {move || display.with(|d| d.dominant_display.clone())}
                    </span>
                    <span id="dominant-emotion-badge" class=badge_class>
                        {move || display.with(|d| d.badge_text.clone())}
                    </span>
                </div>

                <div class="emotion-bars">
                    {EmotionLabel::all()
                        .iter()
                        .map(|&label| view! { <EmotionBar label display=ctx.display /> })
                        .collect_view()}
                </div>

                <canvas id="emotion-chart" width="340" height="340" node_ref=ctx.canvas></canvas>
            </section>
        </main>
    }
}

#[component]
fn EmotionBar(label: EmotionLabel, display: RwSignal<DisplayUpdate>) -> impl IntoView {
    view! {
        <div class="emotion-row">
            <span class="emotion-name">{label.display_name()}</span>
            <div class="progress-track">
                <div
                    class="progress-bar"
                    id=format!("progress-{}", label.label())
                    data-label=label.display_name()
                    style=move || {
                        format!(
                            "{} background-color: {};",
                            display.with(|d| d.bar_width(label)),
                            label.color(),
                        )
                    }
                >
                    {move || display.with(|d| d.bar_text(label))}
                </div>
            </div>
        </div>
    }
}

use leptos::prelude::*;

use crate::stream::FeedPhase;
use crate::ui_model::{Theme, Toast};

#[component]
pub(super) fn Topbar(
    phase: ReadSignal<FeedPhase>,
    theme: RwSignal<Theme>,
) -> impl IntoView {
    let status = move || match phase.get() {
        FeedPhase::Uninitialized => "Starting",
        FeedPhase::RequestingPermission => "Awaiting camera permission",
        FeedPhase::Active => "Live",
        FeedPhase::Reconnecting => "Reconnecting",
        FeedPhase::Inactive => "Stopped",
    };

    view! {
        <header class="app-header">
            <div class="app-header-left">
                <h1 class="brand">"Moodcam"</h1>
                <span class="subtle">"webcam emotion recognition"</span>
            </div>
            <div class="app-header-right">
                <span class="status">{status}</span>
                <Show when=move || phase.get() == FeedPhase::Active>
                    <span class="live-dot"></span>
                </Show>
                <button
                    class="btn sm ghost"
                    title=move || format!("Theme: {}", theme.get().label())
                    on:click=move |_| theme.set(theme.get().toggle())
                >
                    {move || theme.get().icon()}" "{move || theme.get().label()}
                </button>
            </div>
        </header>
    }
}

/// The single transient notification. A newer toast replaces the current one
/// outright; the `show` class drives the enter/exit CSS transition.
#[component]
pub(super) fn NotificationView(toast: ReadSignal<Option<Toast>>) -> impl IntoView {
    view! {
        <Show when=move || toast.get().is_some() fallback=|| ()>
            {move || {
                let t = toast
                    .get()
                    .expect("Show guarantees the toast is Some when rendered");
                let class = if t.visible {
                    format!("{} show", t.level.css_class())
                } else {
                    t.level.css_class().to_string()
                };
                view! {
                    <div class=class role="status" aria-live="polite">
                        {t.message}
                    </div>
                }
            }}
        </Show>
    }
}

#[component]
pub(super) fn PermissionPanel(
    visible: ReadSignal<bool>,
    request: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || visible.get()>
            <div class="permission-request" id="permission-request">
                <p>"Camera access is needed to analyze your emotions."</p>
                <button class="btn" on:click=move |_| request.run(())>
                    "Enable Camera"
                </button>
            </div>
        </Show>
    }
}

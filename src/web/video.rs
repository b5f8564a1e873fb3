//! Camera capability handling.
//!
//! The camera track is requested only so the browser surfaces its permission
//! prompt; the displayed video is rendered server-side, so a granted track is
//! released immediately.

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaStream, MediaStreamConstraints, PermissionState, PermissionStatus};

use crate::stream::PermissionDecision;

pub(super) fn media_devices_supported() -> bool {
    web_sys::window()
        .map(|w| w.navigator().media_devices().is_ok())
        .unwrap_or(false)
}

/// Permissions API pre-check. `None` when the API is unavailable or the
/// query fails; the caller then just tries to start the feed.
pub(super) async fn query_camera_permission() -> Option<PermissionDecision> {
    let navigator = web_sys::window()?.navigator();
    let permissions = navigator.permissions().ok()?;

    let descriptor = js_sys::Object::new();
    Reflect::set(&descriptor, &"name".into(), &"camera".into()).ok()?;

    let status = JsFuture::from(permissions.query(&descriptor).ok()?).await.ok()?;
    let status: PermissionStatus = status.dyn_into().ok()?;

    Some(match status.state() {
        PermissionState::Granted => PermissionDecision::Granted,
        PermissionState::Prompt => PermissionDecision::Prompt,
        _ => PermissionDecision::Denied,
    })
}

/// Surface the browser's camera prompt, then stop every acquired track.
pub(super) async fn request_camera_permission() -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| "mediaDevices unavailable".to_string())?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|_| "getUserMedia unavailable".to_string())?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|_| "camera permission denied".to_string())?;
    let stream: MediaStream = stream
        .dyn_into()
        .map_err(|_| "unexpected getUserMedia result".to_string())?;

    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web_sys::MediaStreamTrack>() {
            track.stop();
        }
    }
    Ok(())
}

use wasm_bindgen::JsCast;

use crate::ui_model::Theme;

pub(super) const THEME_KEY: &str = "moodcam.theme.v1";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(super) fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

pub(super) fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

pub(super) fn load_theme() -> Theme {
    Theme::from_stored(local_storage_get_string(THEME_KEY).as_deref())
}

pub(super) fn save_theme(theme: Theme) {
    local_storage_set_string(THEME_KEY, theme.label());
}

/// Write the palette onto the document element, swap the body class pair and
/// mirror the choice into `data-theme`.
pub(super) fn apply_theme_to_document(theme: Theme) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if let Some(root) = doc.document_element() {
        let _ = root.set_attribute("data-theme", theme.label());
        if let Ok(root) = root.dyn_into::<web_sys::HtmlElement>() {
            let style = root.style();
            for (name, value) in theme.palette() {
                let _ = style.set_property(name, value);
            }
        }
    }

    if let Some(body) = doc.body() {
        let classes = body.class_list();
        let _ = classes.remove_1(theme.toggle().body_class());
        let _ = classes.add_1(theme.body_class());
    }
}

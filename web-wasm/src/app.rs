//! メインアプリケーションコンポーネント

use car_damage_common::{
    BoundingBox, DamageSession, Error, ExportFormat, PointerPos, ValidationError, Variant,
};
use leptos::prelude::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use crate::api::sheet::dispatch_events;
use crate::components::{
    damage_form::DamageForm, diagram::Diagram, export_buttons::ExportButtons, header::Header,
    selector::CarSelector,
};
use crate::export::export_diagram;
use crate::store::LocalStorageStore;

pub type Session = DamageSession<LocalStorageStore>;

/// `?variant=photo-required` のようにURLで画面バリアントを選ぶ
pub fn variant_from_query(search: &str) -> Variant {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "variant")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or_default()
}

fn now_timestamp() -> String {
    js_sys::Date::new_0()
        .to_locale_string("ja-JP", &JsValue::UNDEFINED)
        .into()
}

#[component]
pub fn App() -> impl IntoView {
    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let variant = variant_from_query(&search);

    match DamageSession::open(variant.config(), LocalStorageStore::default()) {
        Ok(session) => view! { <DamageApp session=session /> }.into_any(),
        Err(e) => view! {
            <div class="container">
                <Header />
                <p class="status">{format!("台帳を開けません: {}", e)}</p>
            </div>
        }
        .into_any(),
    }
}

#[component]
fn DamageApp(session: Session) -> impl IntoView {
    let session = RwSignal::new(session);
    let (status, set_status) = signal(String::new());
    let (is_exporting, set_is_exporting) = signal(false);

    let on_select = move |car: String| {
        session.update(|s| match s.select(&car) {
            Ok(()) => set_status.set(String::new()),
            Err(e) => set_status.set(e.to_string()),
        });
    };

    // 図のクリック → 記録・通知
    let on_place = move |pointer: PointerPos, bbox: BoundingBox| {
        let timestamp = now_timestamp();
        let mut outcome = None;
        session.update(|s| {
            let placed = s.place(pointer, bbox, timestamp);
            outcome = Some((placed, s.take_outbound()));
        });
        let Some((placed, events)) = outcome else {
            return;
        };

        match placed {
            Ok(_) => {
                set_status.set(String::new());
                spawn_local(dispatch_events(events));
            }
            Err(Error::Validation(ValidationError::PhotoRequired)) => {
                gloo::dialogs::alert(&ValidationError::PhotoRequired.to_string());
            }
            Err(e) => set_status.set(e.to_string()),
        }
    };

    let on_export = move |format: ExportFormat| {
        let car = session.with_untracked(|s| s.selected().to_string());
        set_is_exporting.set(true);
        spawn_local(async move {
            if let Err(e) = export_diagram(&car, format).await {
                gloo::console::error!(e.as_str());
                set_status.set(e);
            }
            set_is_exporting.set(false);
        });
    };

    view! {
        <div class="container">
            <Header />
            <CarSelector session=session on_select=on_select />
            <Diagram session=session on_place=on_place />
            <DamageForm session=session />
            <Show when=move || !status.get().is_empty()>
                <p class="status">{move || status.get()}</p>
            </Show>
            <ExportButtons is_exporting=is_exporting on_export=on_export />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_query() {
        assert_eq!(variant_from_query(""), Variant::Standard);
        assert_eq!(variant_from_query("?variant=photo-required"), Variant::PhotoRequired);
        assert_eq!(variant_from_query("?lang=ja&variant=compact"), Variant::Compact);
    }

    #[test]
    fn test_unknown_variant_falls_back_to_standard() {
        assert_eq!(variant_from_query("?variant=deluxe"), Variant::Standard);
    }
}

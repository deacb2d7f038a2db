//! 写真・メモ入力

use car_damage_common::PhotoDataUri;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader, HtmlInputElement};

use crate::app::Session;

#[component]
pub fn DamageForm(session: RwSignal<Session>) -> impl IntoView {
    let require_photo = session.with_untracked(|s| s.variant().require_photo);
    let note = move || session.with(|s| s.pending().note.clone());
    let preview = move || session.with(|s| s.pending().photo.as_ref().map(|p| p.as_str().to_string()));

    let on_file = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            read_file(file, move |data_url| match PhotoDataUri::parse(data_url) {
                Ok(photo) => session.update(|s| s.set_photo(photo)),
                Err(e) => gloo::console::warn!(e.to_string()),
            });
        }
    };

    view! {
        <div class="damage-form">
            <label>{if require_photo { "写真（必須）" } else { "写真" }}</label>
            <input type="file" accept="image/*" on:change=on_file />
            <textarea
                placeholder="メモを入力"
                prop:value=note
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    session.update(|s| s.set_note(value));
                }
            />
            {move || preview().map(|src| view! { <img src=src alt="preview" width="128" /> })}
        </div>
    }
}

fn read_file<F>(file: File, on_loaded: F)
where
    F: Fn(String) + 'static,
{
    let Ok(reader) = FileReader::new() else {
        gloo::console::error!("FileReaderを作成できません");
        return;
    };

    let reader_clone = reader.clone();
    let closure = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
        if let Ok(result) = reader_clone.result() {
            if let Some(data_url) = result.as_string() {
                on_loaded(data_url);
            }
        }
    }) as Box<dyn FnMut(_)>);

    reader.set_onload(Some(closure.as_ref().unchecked_ref()));
    closure.forget();

    if let Err(e) = reader.read_as_data_url(&file) {
        gloo::console::error!(e);
    }
}

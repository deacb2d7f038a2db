//! エクスポートボタンコンポーネント

use car_damage_common::ExportFormat;
use leptos::prelude::*;

#[component]
pub fn ExportButtons<FE>(is_exporting: ReadSignal<bool>, on_export: FE) -> impl IntoView
where
    FE: Fn(ExportFormat) + 'static + Clone,
{
    view! {
        <div class="export-buttons">
            <button
                class="btn btn-primary"
                disabled=move || is_exporting.get()
                on:click={
                    let on_export = on_export.clone();
                    move |_| on_export(ExportFormat::Pdf)
                }
            >
                {move || if is_exporting.get() { "保存中..." } else { "PDFで保存" }}
            </button>

            <button
                class="btn btn-secondary"
                disabled=move || is_exporting.get()
                on:click={
                    let on_export = on_export.clone();
                    move |_| on_export(ExportFormat::Png)
                }
            >
                "PNGで保存"
            </button>
        </div>
    }
}

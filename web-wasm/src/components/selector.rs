//! 号車選択

use leptos::prelude::*;
use crate::app::Session;

#[component]
pub fn CarSelector<F>(session: RwSignal<Session>, on_select: F) -> impl IntoView
where
    F: Fn(String) + 'static,
{
    let cars = session.with_untracked(|s| s.car_ids().to_vec());
    let selected = move || session.with(|s| s.selected().to_string());

    view! {
        <div class="car-selector">
            <label for="car-select">"号車選択："</label>
            <select
                id="car-select"
                prop:value=selected
                on:change=move |ev| on_select(event_target_value(&ev))
            >
                {cars
                    .into_iter()
                    .map(|car| view! { <option value=car.clone()>{car}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}

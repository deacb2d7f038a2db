//! 車両図・マーカー・詳細ポップアップ

use car_damage_common::export::DIAGRAM_ELEMENT_ID;
use car_damage_common::{BoundingBox, Marker, MarkerStyle, PointerPos};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MouseEvent;

use crate::app::Session;

const DIAGRAM_SRC: &str = "car-top-view.png";

fn marker_class(marker: &Marker) -> &'static str {
    match marker.style {
        MarkerStyle::Badge => "marker badge",
        MarkerStyle::Dot => "marker dot",
    }
}

/// クリック位置と、その時点の図の表示矩形
fn click_geometry(ev: &MouseEvent) -> Option<(PointerPos, BoundingBox)> {
    let element = ev.current_target()?.dyn_into::<web_sys::Element>().ok()?;
    let rect = element.get_bounding_client_rect();
    let bbox = BoundingBox::new(rect.left(), rect.top(), rect.width(), rect.height());
    let pointer = PointerPos::new(ev.client_x() as f64, ev.client_y() as f64);
    Some((pointer, bbox))
}

#[component]
pub fn Diagram<F>(session: RwSignal<Session>, on_place: F) -> impl IntoView
where
    F: Fn(PointerPos, BoundingBox) + 'static,
{
    let markers = move || {
        session
            .with(|s| s.markers())
            .into_iter()
            .map(|marker| {
                let index = marker.index;
                view! {
                    <div
                        class=marker_class(&marker)
                        style=marker.css_position()
                        title=marker.tooltip.clone()
                        on:click=move |ev: MouseEvent| {
                            ev.stop_propagation();
                            session.update(|s| {
                                if let Err(e) = s.open_popup(index) {
                                    gloo::console::warn!(e.to_string());
                                }
                            });
                        }
                    >
                        {marker.label}
                    </div>
                }
            })
            .collect_view()
    };

    let popup = move || {
        session.with(|s| s.popup().cloned()).map(|target| {
            let style = format!("top: {}%; left: {}%;", target.record.y, target.record.x);
            view! {
                <div class="popup" style=style>
                    <img src=target.record.photo_url.clone() alt="damage" />
                    {target.lines().into_iter().map(|line| view! { <p>{line}</p> }).collect_view()}
                    <button class="text-muted" on:click=move |_| session.update(|s| s.close_popup())>
                        "閉じる"
                    </button>
                </div>
            }
        })
    };

    view! {
        <div id=DIAGRAM_ELEMENT_ID class="car-area">
            <img
                src=DIAGRAM_SRC
                alt="car"
                on:click=move |ev: MouseEvent| {
                    if let Some((pointer, bbox)) = click_geometry(&ev) {
                        on_place(pointer, bbox);
                    }
                }
            />
            {markers}
            {popup}
        </div>
    }
}

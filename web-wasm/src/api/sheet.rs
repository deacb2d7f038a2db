//! スプレッドシート送信・通知
//!
//! ブラウザ版は Webhook を持たないため、通知はコンソール出力のみ。

use car_damage_common::{OutboundEvent, SheetPayload, DEFAULT_SHEET_URL};
use futures::future::join_all;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// 配置時のイベントをまとめて送信する。失敗はログに残すだけ
pub async fn dispatch_events(events: Vec<OutboundEvent>) {
    join_all(events.iter().map(dispatch_one)).await;
}

async fn dispatch_one(event: &OutboundEvent) {
    match event {
        OutboundEvent::Notify { message, .. } => {
            gloo::console::log!("Slack通知:", message.as_str());
        }
        OutboundEvent::SheetRow(payload) => match post_row(DEFAULT_SHEET_URL, payload).await {
            Ok(()) => gloo::console::log!("📋 スプレッドシートに送信成功"),
            Err(e) => gloo::console::error!("❌ スプレッドシート送信エラー", e),
        },
    }
}

async fn post_row(url: &str, payload: &SheetPayload) -> Result<(), JsValue> {
    let body = serde_json::to_string(payload).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    Ok(())
}

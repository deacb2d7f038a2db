//! UIコンポーネント

pub mod damage_form;
pub mod diagram;
pub mod export_buttons;
pub mod header;
pub mod selector;

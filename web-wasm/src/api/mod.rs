//! 外部送信

pub mod sheet;

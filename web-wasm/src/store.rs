//! localStorage 上の台帳

use car_damage_common::store::decode_ledger;
use car_damage_common::{Ledger, LedgerStore, LoadPolicy, Result, StorageError, STORAGE_KEY};
use gloo::storage::{LocalStorage, Storage};

/// 壊れたデータの退避先キー
const CORRUPT_KEY: &str = "damageRecords.corrupt";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore {
    policy: LoadPolicy,
}

impl LocalStorageStore {
    pub fn new(policy: LoadPolicy) -> Self {
        Self { policy }
    }
}

impl LedgerStore for LocalStorageStore {
    fn load(&self) -> Result<Ledger> {
        let storage = LocalStorage::raw();
        let raw = storage
            .get_item(STORAGE_KEY)
            .map_err(|e| StorageError::Read(format!("{:?}", e)))?;

        if let Some(raw) = raw.as_deref() {
            if self.policy == LoadPolicy::FallbackEmpty && Ledger::from_json(raw).is_err() {
                if let Err(e) = storage.set_item(CORRUPT_KEY, raw) {
                    gloo::console::warn!(format!("壊れた台帳を退避できません: {:?}", e));
                }
            }
        }
        decode_ledger(raw.as_deref(), self.policy)
    }

    fn save(&mut self, ledger: &Ledger) -> Result<()> {
        let json = ledger.to_json()?;
        LocalStorage::raw()
            .set_item(STORAGE_KEY, &json)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))?;
        Ok(())
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use car_damage_common::DamageRecord;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn record() -> DamageRecord {
        DamageRecord {
            x: 25.0,
            y: 25.0,
            note: "scratch".to_string(),
            photo_url: car_damage_common::PLACEHOLDER_PHOTO_URL.to_string(),
            timestamp: None,
            uploader: None,
        }
    }

    #[wasm_bindgen_test]
    fn wasm_ledger_round_trip() {
        let mut store = LocalStorageStore::default();
        let mut ledger = Ledger::new();
        ledger.append("1号車", record());
        store.save(&ledger).expect("save failed");

        let loaded = store.load().expect("load failed");
        assert_eq!(loaded.records("1号車").len(), 1);
        LocalStorage::delete(STORAGE_KEY);
    }

    #[wasm_bindgen_test]
    fn wasm_malformed_data_is_kept_aside() {
        LocalStorage::raw().set_item(STORAGE_KEY, "{").expect("set failed");

        let loaded = LocalStorageStore::default().load().expect("load failed");
        assert!(loaded.is_empty());
        assert_eq!(LocalStorage::raw().get_item(CORRUPT_KEY).ok().flatten().as_deref(), Some("{"));

        assert!(LocalStorageStore::new(LoadPolicy::FailFast).load().is_err());
        LocalStorage::delete(STORAGE_KEY);
        LocalStorage::delete(CORRUPT_KEY);
    }
}

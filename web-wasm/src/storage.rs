//! localStorage の履歴スロット
//!
//! 読み込みは失敗しない。保存に失敗しても更新後のリストを返す。

use meal_log_common::{parse_history, prepend, serialize_history, HistoryList, NutritionRecord, HISTORY_KEY};
use web_sys::Storage;

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load_history() -> HistoryList {
    let raw = local_storage().and_then(|s| s.get_item(HISTORY_KEY).ok().flatten());
    parse_history(raw.as_deref())
}

pub fn append_history(record: NutritionRecord) -> HistoryList {
    let updated = prepend(&load_history(), record);

    let saved = match (local_storage(), serialize_history(&updated)) {
        (Some(storage), Ok(raw)) => storage.set_item(HISTORY_KEY, &raw).is_ok(),
        _ => false,
    };
    if !saved {
        gloo::console::error!("Failed to save history to localStorage");
    }

    updated
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn clear() {
        if let Some(storage) = local_storage() {
            storage.remove_item(HISTORY_KEY).expect("remove failed");
        }
    }

    #[wasm_bindgen_test]
    fn wasm_append_history_persists_newest_first() {
        clear();
        let first = NutritionRecord {
            id: Some("a".to_string()),
            meal_name: "Oatmeal".to_string(),
            ..Default::default()
        };
        let second = NutritionRecord {
            id: Some("b".to_string()),
            meal_name: "Ramen".to_string(),
            ..Default::default()
        };

        append_history(first);
        let updated = append_history(second);

        assert_eq!(updated[0].meal_name, "Ramen");
        assert_eq!(load_history(), updated);
        clear();
    }

    #[wasm_bindgen_test]
    fn wasm_corrupted_slot_loads_empty() {
        let storage = local_storage().expect("localStorage unavailable");
        storage.set_item(HISTORY_KEY, "{not json").expect("set failed");

        assert!(load_history().is_empty());
        clear();
    }
}

//! Meal Log Common Library
//!
//! CLIとWeb(WASM)で共有される型・レスポンス補正・画面状態マシン

pub mod types;
pub mod error;
pub mod parser;
pub mod data_url;
pub mod sheet;
pub mod history;
pub mod state;
pub mod format;

pub use types::{MealType, NutritionRecord};
pub use error::{Error, Result};
pub use parser::{extract_json, parse_nutrition_response, record_from_value};
pub use data_url::DataUrl;
pub use sheet::SheetRow;
pub use history::{parse_history, prepend, serialize_history, HistoryList, HISTORY_KEY};
pub use state::{transition, AnalysisRequest, AppState, Effect, Event, Screen};
pub use format::{format_amount, format_logged_date};

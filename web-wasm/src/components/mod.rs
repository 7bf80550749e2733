pub mod camera_capture;
pub mod header;
pub mod history_view;
pub mod meal_form;
pub mod mode_selector;
pub mod nutrition_result;

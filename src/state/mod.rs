pub mod app_settings;
pub mod app_state;
pub mod bracket;
pub mod messages;
pub mod network;
pub mod notifications;
pub mod refresher;
pub mod result_form;

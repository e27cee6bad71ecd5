pub mod board;
pub mod calendar;
pub mod list_view;
pub mod settings_ops;
pub mod stats;
pub mod task_ops;
pub mod transfer;

pub mod activity;
pub mod config;
pub mod record;
pub mod store;
pub mod task;
pub mod vocab;

pub use activity::*;
pub use config::*;
pub use record::{RecordError, TaskRecord};
pub use store::*;
pub use task::*;

pub mod dispatch;
pub mod history;
pub mod list;
pub mod run;
pub mod schedule;
pub mod schema;
pub mod show;
pub mod summary;

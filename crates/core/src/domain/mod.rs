pub mod build;
pub mod part;
pub mod view_event;

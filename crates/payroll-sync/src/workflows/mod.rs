pub mod mapping;
pub mod pipeline;
pub mod submission;
pub mod waiting_events;

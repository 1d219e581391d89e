// Domain layer - Dashboard documents and caller input, no I/O
pub mod dashboard;
pub mod error;
pub mod selection;
pub mod templates;
pub mod time_range;

pub mod list;
pub mod plot;

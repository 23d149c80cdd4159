pub mod parameters;
pub mod records;

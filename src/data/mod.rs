pub mod catalog;
pub mod spells;
pub mod table;
pub mod validate;

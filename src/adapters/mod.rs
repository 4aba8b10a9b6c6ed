pub mod datajud;
pub mod store;

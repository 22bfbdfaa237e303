pub mod book;
pub mod text;
pub mod volumes;

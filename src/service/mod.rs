pub mod address_book;

pub use address_book::{derive_rows, AddressRow, BatchRequest};

pub mod catalog;
pub mod check;
pub mod init;
pub mod serve;

pub use catalog::{catalog, CatalogArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use serve::{serve, ServeArgs};

pub mod error;
pub mod sanitize;
pub mod secrets;
pub mod store;
pub mod sweep;

pub use error::StoreError;
pub use sanitize::sanitize;
pub use store::Store;
pub use sweep::sweep;

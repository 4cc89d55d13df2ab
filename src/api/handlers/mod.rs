//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod codes;
pub mod health;
pub mod live;
pub mod redirect;

pub use codes::{
    create_codes_handler, delete_code_handler, list_codes_handler, rename_code_handler,
};
pub use health::health_handler;
pub use live::live_handler;
pub use redirect::redirect_handler;

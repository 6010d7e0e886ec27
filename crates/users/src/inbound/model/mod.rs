pub mod api;
pub mod login;
pub mod page;

pub mod prelude {
    pub use super::api::*;
    pub use super::login::*;
    pub use super::page::*;
}

pub mod login;
pub mod profile;
pub mod settings;
pub mod sync;

pub mod prelude {
    pub use super::login::*;
    pub use super::profile::*;
    pub use super::settings::*;
    pub use super::sync::*;
}

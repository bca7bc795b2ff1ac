//! Built-in GraphQL controllers
//!
//! Optional resolvers the wiring pass registers when the matching security
//! toggle resolves to enabled: the `login`/`logout` mutations and the `me`
//! query.

pub mod login;
pub mod me;

pub use login::LoginController;
pub use me::MeController;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, AuthSession};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod bootstrap;
pub use bootstrap::{BootstrapReport, BootstrapService};

pub mod token;
pub use token::{Claims, TokenError, TokenService};

// Models module

pub mod astro;
pub mod post;
pub mod user;

// Re-export commonly used types
pub use astro::{AstroRequest, CelestialPosition, CivilDateTime, DateInput, Degree};
pub use post::{Post, PostDocument};
pub use user::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, User};

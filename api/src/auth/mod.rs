pub mod gate;
pub mod ownership;
pub mod password;
pub mod token;

pub use gate::{AuthGate, CurrentUser};
pub use password::PasswordHasher;
pub use token::{Claims, TokenCodec, TokenError};

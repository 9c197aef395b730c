//! Authentication Module
//!
//! Password accounts and stateless JWT sessions. Signed-in callers are
//! identified per request by the `Caller` extractor in
//! [`crate::backend::middleware`].
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and lookups
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers (signup, login, me)
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: email, password and display name → user stored → JWT token returned
//! 2. **Login**: email and password → credentials verified → JWT token returned
//! 3. **Me**: JWT token → token verified → user info returned
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens expire after 30 days
//! - Invalid credentials return 401 (no information leakage)

/// User data model and lookups
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, MeResponse, SignupRequest, UserResponse};
pub use handlers::{get_me, login, signup};

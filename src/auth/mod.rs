//! Authentication Module
//!
//! Registration, login, and JWT session management.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports
//! ├── sessions.rs     - JWT token creation and verification
//! ├── service.rs      - AuthService (register/login/verify against the store)
//! └── handlers/       - HTTP handlers
//!     ├── mod.rs      - Handler exports
//!     ├── types.rs    - Request/response types
//!     ├── register.rs - POST /api/register
//!     └── login.rs    - POST /api/login
//! ```
//!
//! # Security
//!
//! - Clients hash their password with bcrypt before registration; the server
//!   stores the hash verbatim and never returns it
//! - Login verifies the plaintext against the stored hash with bcrypt's
//!   constant-time verify
//! - Tokens are HS256 JWTs carrying the username, expiring after 30 days

/// JWT token generation and validation
pub mod sessions;

/// Registration/login/verification against the credential store
pub mod service;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest};
pub use handlers::{login, register};
pub use service::AuthService;

/// Authentication primitives for the taskboard
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session credential (JWT) generation and validation
/// - [`reset`]: Single-use, time-limited password-reset tokens
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Credentials**: HS256 signing, stateless verification,
///   configurable expiry (default 7 days)
/// - **Reset Tokens**: 32 bytes of OS randomness, single-use, 1 hour TTL
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(42, "user@example.com".to_string());
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod reset;

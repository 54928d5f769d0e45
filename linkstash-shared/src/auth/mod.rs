/// Authentication primitives
///
/// Session handling for the API: JWT access/refresh tokens, Argon2id password
/// hashing, and the middleware context injected into authenticated requests.
///
/// Every protected route sees authentication as a single capability: resolve
/// the request headers to a user id, or reject with 401. The middleware in
/// this module is the only place that capability is implemented.
pub mod jwt;
pub mod middleware;
pub mod password;

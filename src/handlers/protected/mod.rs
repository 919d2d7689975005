// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here takes an `AuthUser`, so a missing or invalid token is
// rejected with 401 before any store access. Two kinds of email check follow:
//
// - Email-scoped lists (GET /classes, GET /carts) answer 403 when the token
//   email differs from the `email` query.
// - Role checks (GET /users/admin/:email, GET /users/instructor/:email)
//   answer `false` instead.

pub mod carts;   // GET /carts, DELETE /carts/:id
pub mod classes; // GET /classes, POST /class, GET /pending
pub mod users;   // GET /users/admin/:email, GET /users/instructor/:email

pub use carts::{cart_delete, carts_get};
pub use classes::{class_post, classes_by_email, pending_get};
pub use users::{admin_check, instructor_check};

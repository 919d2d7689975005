// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Catalogue reads, token issuing, account registration and the review
// mutations. Role updates and approve/deny sit here too: they carry no
// token check.

pub mod carts;       // POST /carts
pub mod classes;     // /classes/all, /classes/:id, /home/classes, /approve, /deny
pub mod instructors; // /instructors, /instructors/:id, /home/instructors
pub mod jwt;         // POST /jwt
pub mod root;        // GET /, GET /health
pub mod users;       // /users, PATCH role updates

pub use carts::carts_post;
pub use classes::{approve_patch, class_get, classes_all, deny_patch, home_classes};
pub use instructors::{home_instructors, instructor_get, instructors_list};
pub use jwt::jwt_post;
pub use root::{health, root};
pub use users::{make_admin, make_instructor, users_get, users_post};

pub mod carts;
pub mod classes;
pub mod instructors;
pub mod users;

pub use carts::CartService;
pub use classes::ClassService;
pub use instructors::InstructorService;
pub use users::UserService;

use crate::database::InsertResult;

/// Result of an insert guarded by a uniqueness check.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(InsertResult),
    AlreadyExists,
}

impl From<Option<InsertResult>> for CreateOutcome {
    fn from(result: Option<InsertResult>) -> Self {
        match result {
            Some(inserted) => CreateOutcome::Created(inserted),
            None => CreateOutcome::AlreadyExists,
        }
    }
}

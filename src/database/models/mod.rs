pub mod cart_item;
pub mod class_offering;
pub mod lenient;
pub mod user;

pub use cart_item::NewCartItem;
pub use class_offering::{ClassStatus, NewClassOffering};
pub use user::{NewUser, User, UserRole};

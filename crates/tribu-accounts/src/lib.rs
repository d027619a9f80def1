pub mod flows;
pub mod password;
pub mod store;

pub use flows::{AccountError, ProfileForm, RegistrationForm};
pub use store::{ConflictField, NewUser, ProfileUpdate, StoreError, User, UserStore};

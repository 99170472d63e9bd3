pub mod catalog;
pub mod coordinator;
pub mod messages;
pub mod selection;
pub mod validator;
pub mod verification;

pub use crate::domain::model::{Category, Classification, Selection};
pub use crate::domain::ports::{BallotApi, SessionStore};
pub use crate::utils::error::Result;

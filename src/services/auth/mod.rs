pub mod sign;
pub mod token_provider;
pub mod user_details;

pub use token_provider::TokenProvider;
pub use user_details::{CachingUserLookup, DbUserLookup, Principal, UserLookup};

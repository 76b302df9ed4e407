pub mod error;
pub mod friend_repo;
pub mod message_repo;
pub mod room_repo;
pub mod user_repo;

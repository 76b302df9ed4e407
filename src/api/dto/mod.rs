pub mod friends;
pub mod messages;
pub mod rooms;
pub mod sign;
pub mod users;

pub mod exception;
pub mod friends;
pub mod health;
pub mod messages;
pub mod rooms;
pub mod sign;
pub mod users;

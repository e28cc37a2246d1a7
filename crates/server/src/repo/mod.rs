pub mod complaint;
pub mod notification;

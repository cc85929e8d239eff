pub mod blend;
pub mod layout;
pub mod orientation;

pub mod check;
pub mod control;
pub mod layout;
pub mod player;
pub mod shift;
pub mod stdin_handler;

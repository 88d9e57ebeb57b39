#![forbid(unsafe_code)]

pub mod topbar;
pub mod statusbar;

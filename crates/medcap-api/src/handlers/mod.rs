pub mod home;
pub mod process;

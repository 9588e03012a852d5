pub mod example;
pub mod install;
pub mod version;

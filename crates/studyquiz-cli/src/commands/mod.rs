pub mod init;
pub mod parse;
pub mod profile;
pub mod quiz;
pub mod score;

pub mod accounts;
pub mod preferences;
pub mod youtube;

pub mod attempt;
pub mod mailing;
pub mod message;
pub mod recipient;
pub mod user;

pub mod attempt_service;
pub mod auth_service;
pub mod cache;
pub mod dispatch_service;
pub mod mailing_service;
pub mod message_service;
pub mod recipient_service;
pub mod stats_service;

pub mod cart_service;
pub mod content_service;

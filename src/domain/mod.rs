pub mod cart;
pub mod catalog;
pub mod content;
pub mod customization;
pub mod errors;
pub mod events;
pub mod ports;
pub mod pricing;
pub mod promotion;
pub mod variant;

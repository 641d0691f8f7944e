pub mod cart;
pub mod checkout;
pub mod errors;
pub mod ports;

pub mod check_in_out;
pub mod client;
pub mod contract;
pub mod id;
pub mod lifecycle;
pub mod payment;
pub mod reservation;
pub mod room;
pub mod service;

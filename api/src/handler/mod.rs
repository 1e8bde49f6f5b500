pub mod check_in_out;
pub mod contract;
pub mod health;
pub mod payment;
pub mod reservation;

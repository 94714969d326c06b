pub mod payment_requests;
pub mod transfers;
pub mod users;

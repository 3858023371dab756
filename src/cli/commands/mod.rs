pub mod accounts;
pub mod gyms;
pub mod purge;
pub mod seed;
pub mod sessions;

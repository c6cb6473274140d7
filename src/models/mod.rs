mod client;
mod phone;

pub use client::{Client, ClientSummary, NewClient};
pub use phone::{Phone, PhoneOutcome};

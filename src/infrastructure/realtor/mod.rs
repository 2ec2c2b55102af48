//! Realtor listing/agent search (RapidAPI "realtor16")

mod client;

pub use client::{RealtorClient, RealtorConfig, REALTOR_HOST};

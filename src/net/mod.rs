//! HTTP plumbing shared by the IP probe and the speed test

pub mod client;
pub mod ipinfo;

pub use client::{build_client, HttpSource};
pub use ipinfo::{IpInfo, IpInfoProbe, IpReport};

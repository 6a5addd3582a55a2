//! File readers for the network dataset (JSON) and the load profiles (CSV).
mod network;
mod profile;

pub use network::{load_network_json, network_from_str};
pub use profile::{load_profile_csv, parse_timestamp, read_load_profile};

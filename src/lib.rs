pub mod config;
pub mod importers;
pub mod inventory;
pub mod response;
pub mod stationxml;
pub mod utils;

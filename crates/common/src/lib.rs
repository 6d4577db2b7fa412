pub mod config;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "contract")]
pub mod contract;

//! Battery Guardian core: battery sampling, threshold policy, and alert
//! dispatch. Headless by design: the tray frontend consumes the channels
//! exposed here and never reaches into the loop itself.

pub mod alert;
pub mod config;
pub mod monitor;
pub mod power;
pub mod shutdown;

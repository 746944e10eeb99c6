//! Mock analytics dashboard: simulated business metrics painted into two
//! charts and a set of text panels on every refresh cycle.

pub mod config;
pub mod format;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod output;
pub mod random;
pub mod render;
pub mod simulate;
pub mod view;

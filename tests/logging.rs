//! Log filter setup used by the binaries.

use env_logger::{Builder, Env};
use log::LevelFilter;

#[test]
fn unset_level_variable_defaults_to_info() {
    let logger = Builder::from_env(Env::default().filter_or("FILTER_CONTROL_LOG_NEVER_SET", "info")).build();
    assert_eq!(logger.filter(), LevelFilter::Info);
}

#[test]
fn level_variable_accepts_module_directives() {
    let logger = Builder::new().parse_filters("warn,filter_control=debug").build();
    assert_eq!(logger.filter(), LevelFilter::Debug);
}

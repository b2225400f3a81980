/// Construct a `ConfigError::InvalidConfig` from a format string.
macro_rules! invalid {
    ($fmt:expr) => {
        $crate::ConfigError::InvalidConfig(format!($fmt))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::ConfigError::InvalidConfig(format!($fmt, $($arg)*))
    };
}

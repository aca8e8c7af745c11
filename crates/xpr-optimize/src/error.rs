use xpr_core::error::Error;

/// Create an error for expressions that cannot be combined
pub fn combination_error(message: impl Into<String>) -> Error {
    Error::Combination(message.into())
}

/// Macro to return early with a combination error
#[macro_export]
macro_rules! opt_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::combination_error(format!($($arg)*)))
    };
}

/// Macro to ensure a condition is true, or return a combination error
#[macro_export]
macro_rules! opt_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::opt_bail!($($arg)*);
        }
    };
}

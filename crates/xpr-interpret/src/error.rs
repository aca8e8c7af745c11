use xpr_core::error::Error;

/// Create a lowering error
pub fn lowering_error(message: impl Into<String>) -> Error {
    Error::Lowering(message.into())
}

/// Macro to return early with a lowering error
#[macro_export]
macro_rules! lowering_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::lowering_error(format!($($arg)*)))
    };
}

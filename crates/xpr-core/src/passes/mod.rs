mod capture;
mod free_params;
mod substitute;

pub use capture::*;
pub use free_params::*;
pub use substitute::*;

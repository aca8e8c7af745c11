mod expr;
mod handle;
mod param;
mod ty;
mod typed;
mod value;

pub use expr::*;
pub use handle::*;
pub use param::*;
pub use ty::*;
pub use typed::*;
pub use value::*;

// xpr-optimize: tree transformations built on the evaluator
//
// - passes: the expander inlining expression values at their evaluate/compile call sites
// - combine: boolean composition of lambdas sharing a signature
// - ext: convenience methods on expression values

pub mod combine;
pub mod error;
pub mod ext;
pub mod passes;

pub use combine::*;
pub use ext::*;
pub use passes::*;

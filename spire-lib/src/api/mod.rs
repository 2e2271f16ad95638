/*!

The pluggable surface of the engine: the input statement interface consumed from the
preprocessor, the `Calculus` trait the saturation loop drives, and the superposition
calculus implementing it. A different calculus (or an extension registering extra
rules) plugs in here without touching `core`.

*/

pub mod calculus;
pub mod statement;
pub mod superposition;

pub use calculus::Calculus;
pub use statement::{ClauseRole, InputClause, Statement};
pub use superposition::Superposition;

/*!

Types/type aliases that abstract over the implementing backing type.

A motivating example is the `IString` type, an interned string type. Several external
crates could provide this functionality. This crate redirects to whichever implementation
we choose. To use the [`string_cache` crate](https://crates.io/crates/string_cache), we
just define `IString` as an alias for `string_cache::DefaultAtom`:

```ignore
pub use string_cache::DefaultAtom as IString;
```

For infrastructure with a wider API surface than a type alias can capture, we define a
thin abstraction layer over the implementation. The `log` module is backed by `tracing`,
but its public interface consists only of `set_global_logging_threshold()` /
`get_global_logging_threshold()` and the macros `critical!`, `error!`, `warning!`,
`info!`, `debug!`, and `trace!`.

*/

mod nat_set;
mod partial_ordering;
mod string_util;

pub mod hash;
pub mod log;

// Partial-order vocabulary and the multiset extension
pub use partial_ordering::*;

// For vectors that are expected to have few elements.
pub use smallvec::{smallvec, SmallVec};

// A set of (small) natural numbers
pub use nat_set::NatSet;

// Join sequences with a separator
pub use string_util::{int_to_subscript, join_iter, join_string};

// Logging backend, re-exported for the macros in `log`.
pub use tracing;

// Interned string. `DefaultAtom` is a global cache that can be used across threads.
pub use string_cache::DefaultAtom as IString;

/*!

Different text representations are wanted for terms, literals, and clauses depending on
the context: plain output, proof listings, or debugging dumps. The `Formattable` trait
provides a unified API for this. It works like the standard library's `Display`, except
that the caller picks a `FormatStyle`. Both `Debug` and `Display` can be derived from a
`Formattable` implementation with the `impl_display_debug_for_formattable!` macro.

*/

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum FormatStyle {
  #[default]
  Default, // Use the default formatting
  Simple,  // Use a simplified formatting
  Debug,   // Format with extra debugging information
}

pub trait Formattable {
  /// Writes a text representation of `self` according to the given `FormatStyle`.
  /// Use `format!` and friends to create a string.
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result;
}

#[macro_export]
macro_rules! impl_display_debug_for_formattable {
  ($t:ty) => {
    impl std::fmt::Display for $t {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <$t as $crate::core::format::Formattable>::repr(self, f, $crate::core::format::FormatStyle::Default)
      }
    }

    impl std::fmt::Debug for $t {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <$t as $crate::core::format::Formattable>::repr(self, f, $crate::core::format::FormatStyle::Debug)
      }
    }
  };
}
pub use impl_display_debug_for_formattable;

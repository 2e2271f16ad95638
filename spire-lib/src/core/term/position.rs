/*!

Subterm positions. A position is the path of child indices from the root: for an
application the head is child 0 and the arguments follow, an abstraction has its body
at 0, a builtin its arguments from 0. Rewriting and superposition address the replaced
subterm by its position.

*/

use spire_abs::SmallVec;

use super::{Term, TermKind};

pub type Position = SmallVec<[u32; 8]>;

impl Term {
  /// The immediate children, in position order.
  pub fn children(&self) -> SmallVec<[Term; 4]> {
    match self.kind() {
      TermKind::App(head, args) => {
        let mut children = SmallVec::new();
        children.push(head.clone());
        children.extend(args.iter().cloned());
        children
      }
      TermKind::Fun(_, body) => {
        let mut children = SmallVec::new();
        children.push(body.clone());
        children
      }
      TermKind::Builtin(_, args) => args.iter().cloned().collect(),
      _ => SmallVec::new(),
    }
  }

  /// All subterms paired with their positions, in pre-order starting with the term
  /// itself at the empty position.
  pub fn subterms_with_positions(&self) -> Vec<(Term, Position)> {
    let mut result = Vec::with_capacity(self.size() as usize);
    let mut stack: Vec<(Term, Position)> = vec![(self.clone(), Position::new())];
    while let Some((term, position)) = stack.pop() {
      for (index, child) in term.children().into_iter().enumerate().rev() {
        let mut child_position = position.clone();
        child_position.push(index as u32);
        stack.push((child, child_position));
      }
      result.push((term, position));
    }
    result
  }

  pub fn subterm_at(&self, position: &[u32]) -> Option<Term> {
    let mut current = self.clone();
    for &index in position {
      let children = current.children();
      current = children.get(index as usize)?.clone();
    }
    Some(current)
  }

  /// Rebuilds the term with the subterm at `position` replaced. The replacement must
  /// have the type of the subterm it replaces.
  pub fn replace_at(&self, position: &[u32], replacement: &Term) -> Term {
    let Some((&index, rest)) = position.split_first() else {
      return replacement.clone();
    };
    let index = index as usize;
    match self.kind() {
      TermKind::App(head, args) => {
        if index == 0 {
          Term::app(head.replace_at(rest, replacement), args.to_vec())
        } else {
          let mut new_args = args.to_vec();
          new_args[index - 1] = new_args[index - 1].replace_at(rest, replacement);
          Term::app(head.clone(), new_args)
        }
      }
      TermKind::Fun(arg_ty, body) => {
        debug_assert_eq!(index, 0, "abstraction has a single child");
        Term::fun(arg_ty.clone(), body.replace_at(rest, replacement))
      }
      TermKind::Builtin(tag, args) => {
        let mut new_args = args.to_vec();
        new_args[index] = new_args[index].replace_at(rest, replacement);
        Term::builtin(*tag, new_args)
      }
      _ => {
        debug_assert!(false, "position into a leaf term");
        self.clone()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::core::{symbol::Symbol, types::Type};
  use super::*;

  fn setup() -> (Term, Term, Term) {
    let iota = Type::individual();
    let f = Term::constant(
      Symbol::with_type("pos_test_f", Type::arrow(vec![iota.clone(), iota.clone()], iota.clone())).unwrap(),
    );
    let a = Term::constant(Symbol::with_type("pos_test_a", iota.clone()).unwrap());
    let b = Term::constant(Symbol::with_type("pos_test_b", iota).unwrap());
    (f, a, b)
  }

  #[test]
  fn subterm_enumeration_is_preorder() {
    let (f, a, b) = setup();
    let term = Term::app(f, vec![a.clone(), b.clone()]);
    let subterms = term.subterms_with_positions();

    assert_eq!(subterms.len(), 4);
    assert_eq!(subterms[0].0, term);
    assert!(subterms[0].1.is_empty());
    assert_eq!(term.subterm_at(&[1]), Some(a));
    assert_eq!(term.subterm_at(&[2]), Some(b));
    assert_eq!(term.subterm_at(&[3]), None);
  }

  #[test]
  fn replacement_rebuilds_the_spine() {
    let (f, a, b) = setup();
    let term = Term::app(f.clone(), vec![a.clone(), a.clone()]);
    let replaced = term.replace_at(&[2], &b);
    assert_eq!(replaced, Term::app(f, vec![a, b]));
  }

  #[test]
  fn replacement_at_root() {
    let (_, a, b) = setup();
    assert_eq!(a.replace_at(&[], &b), b);
  }
}

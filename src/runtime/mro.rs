//! C3 method resolution order.

use std::rc::Rc;

use super::class::Class;

/// Linearize the ancestors of a class with the given direct bases.
///
/// The result excludes the class itself and lists ancestors most-derived first. Returns `None`
/// when no consistent order exists.
pub fn linearize(bases: &[Rc<Class>]) -> Option<Vec<Rc<Class>>> {
    let mut sequences: Vec<Vec<Rc<Class>>> = bases.iter().map(|base| base.mro()).collect();
    sequences.push(bases.to_vec());

    let mut result: Vec<Rc<Class>> = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| !sequences.iter().any(|seq| seq[1..].iter().any(|c| Rc::ptr_eq(c, head))))
            .cloned()?;

        for seq in &mut sequences {
            if Rc::ptr_eq(&seq[0], &candidate) {
                seq.remove(0);
            }
        }
        result.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ClassBuilder;

    fn names(mro: &[Rc<Class>]) -> Vec<&str> {
        mro.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn diamond_is_linearized() {
        let o = ClassBuilder::new("O").build().unwrap();
        let a = ClassBuilder::new("A").base(&o).build().unwrap();
        let b = ClassBuilder::new("B").base(&o).build().unwrap();
        let c = ClassBuilder::new("C").base(&a).base(&b).build().unwrap();
        assert_eq!(names(&c.mro()), vec!["C", "A", "B", "O"]);
    }

    #[test]
    fn inconsistent_order_is_rejected() {
        let o = ClassBuilder::new("O").build().unwrap();
        let a = ClassBuilder::new("A").base(&o).build().unwrap();
        assert!(linearize(&[Rc::clone(&o), Rc::clone(&a)]).is_none());
    }
}

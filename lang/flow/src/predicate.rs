//! Path conditions in disjunctive normal form.

use std::{collections::BTreeSet, fmt};

/// A possibly negated boolean condition, named by its rendering.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub name: String,
    pub negated: bool,
}

impl Literal {
    pub fn negate(&self) -> Self {
        Literal { name: self.name.clone(), negated: !self.negated }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "{}", self.name)
    }
}

type Clause = BTreeSet<Literal>;

/// An OR of ANDs of literals. `True` is the single empty clause and
/// `False` has no clauses; every constructor keeps the form free of
/// contradictory and absorbed clauses, so equal conditions compare equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Predicate(BTreeSet<Clause>);

impl Predicate {
    pub fn tt() -> Self {
        Predicate(BTreeSet::from([Clause::new()]))
    }
    pub fn ff() -> Self {
        Predicate(BTreeSet::new())
    }
    pub fn atom(name: impl Into<String>) -> Self {
        Predicate::literal(Literal { name: name.into(), negated: false })
    }
    pub fn literal(literal: Literal) -> Self {
        Predicate(BTreeSet::from([Clause::from([literal])]))
    }
    pub fn is_true(&self) -> bool {
        self.0.contains(&Clause::new())
    }
    pub fn is_false(&self) -> bool {
        self.0.is_empty()
    }

    /// `x && l` and `x && !l` together are just `x`.
    fn resolve(a: &Clause, b: &Clause) -> Option<Clause> {
        if a.len() != b.len() {
            return None;
        }
        let mut diff = a.difference(b);
        match (diff.next(), diff.next()) {
            | (Some(lit), None) if b.contains(&lit.negate()) => {
                Some(a.intersection(b).cloned().collect())
            }
            | _ => None,
        }
    }

    fn normalize(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut clauses: BTreeSet<Clause> = (clauses.into_iter())
            .filter(|clause| !clause.iter().any(|lit| clause.contains(&lit.negate())))
            .collect();
        while let Some((a, b, merged)) = clauses.iter().find_map(|a| {
            clauses.iter().find_map(|b| Some((a.clone(), b.clone(), Predicate::resolve(a, b)?)))
        }) {
            clauses.remove(&a);
            clauses.remove(&b);
            clauses.insert(merged);
        }
        // a clause implied by a smaller one adds nothing
        let kept = (clauses.iter())
            .filter(|c| !clauses.iter().any(|d| d != *c && d.is_subset(c)))
            .cloned()
            .collect();
        Predicate(kept)
    }

    pub fn and(&self, other: &Predicate) -> Predicate {
        Predicate::normalize(
            self.0.iter().flat_map(|a| other.0.iter().map(move |b| a.union(b).cloned().collect())),
        )
    }

    pub fn or(&self, other: &Predicate) -> Predicate {
        Predicate::normalize(self.0.iter().chain(other.0.iter()).cloned())
    }

    pub fn negate(&self) -> Predicate {
        // De Morgan: each clause becomes a disjunction of negated literals
        self.0.iter().fold(Predicate::tt(), |acc, clause| {
            let negated =
                Predicate::normalize(clause.iter().map(|lit| Clause::from([lit.negate()])));
            acc.and(&negated)
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_false() {
            return write!(f, "false");
        }
        if self.is_true() {
            return write!(f, "true");
        }
        let clauses: Vec<_> = (self.0.iter())
            .map(|clause| clause.iter().map(|lit| lit.to_string()).collect::<Vec<_>>().join(" && "))
            .collect();
        if clauses.len() == 1 {
            write!(f, "{}", clauses[0])
        } else {
            write!(f, "({})", clauses.join(") || ("))
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn excluded_middle() {
        let c = Predicate::atom("c");
        assert_eq!(c.or(&c.negate()), Predicate::tt());
        assert_eq!(c.and(&c.negate()), Predicate::ff());
    }

    #[test]
    fn absorption() {
        let a = Predicate::atom("a");
        let b = Predicate::atom("b");
        assert_eq!(a.or(&a.and(&b)), a);
        assert_eq!(a.and(&Predicate::tt()), a);
        assert_eq!(a.or(&Predicate::ff()), a);
        assert_eq!(a.and(&b).to_string(), "a && b");
    }

    #[test]
    fn negation_distributes() {
        let a = Predicate::atom("a");
        let b = Predicate::atom("b");
        assert_eq!(a.and(&b).negate().to_string(), "(!a) || (!b)");
        assert_eq!(Predicate::tt().negate(), Predicate::ff());
        assert_eq!(Predicate::ff().negate(), Predicate::tt());
    }
}

//! Restriction checks collected along a type chain.
//!
//! Ein Wert muss die Restriktionen *jeder* Ebene der Kette erfuellen,
//! nicht nur die der naechstliegenden Typdefinition.

use crate::schema::types::{Number, Restrictions, TypeDefinition};
use crate::{Error, Result};

/// Restrictions of every level of a type chain, nearest level first.
#[derive(Debug, Clone, Default)]
pub(crate) struct Constraints {
    levels: Vec<Restrictions>,
}

impl Constraints {
    pub(crate) fn from_chain(ty: &TypeDefinition) -> Self {
        Self {
            levels: ty
                .chain()
                .filter(|t| !t.restrictions.is_empty())
                .map(|t| t.restrictions.clone())
                .collect(),
        }
    }

    /// Alle Patterns aller Ebenen muessen passen.
    pub(crate) fn check_patterns(&self, text: &str) -> Result<()> {
        for level in &self.levels {
            if let Some(p) = level.patterns.iter().find(|p| !p.matches(text)) {
                return Err(Error::PatternMismatch {
                    value: text.to_owned(),
                    pattern: p.regular_expression().to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Pro Ebene muss eines der Laengen-Intervalle passen.
    pub(crate) fn check_length(&self, shown: &str, len: u64) -> Result<()> {
        for level in &self.levels {
            if !level.lengths.is_empty() && !level.lengths.iter().any(|l| l.contains(len)) {
                return Err(Error::out_of_range(shown, level.describe_lengths()));
            }
        }
        Ok(())
    }

    /// Pro Ebene muss eines der Range-Intervalle passen.
    pub(crate) fn check_range(&self, shown: &str, value: &Number) -> Result<()> {
        for level in &self.levels {
            if !level.ranges.is_empty() && !level.ranges.iter().any(|r| r.contains(value)) {
                return Err(Error::out_of_range(shown, level.describe_ranges()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qname::QName;
    use crate::schema::types::BuiltinType;

    fn q(local: &str) -> QName {
        QName::new("urn:test", local)
    }

    /// Restriktionen zweier Ebenen werden UND-verknuepft.
    #[test]
    fn levels_are_conjunctive() {
        let base = TypeDefinition::builtin(BuiltinType::String);
        let t1 = TypeDefinition::derived(q("t1"), base, Restrictions::new().with_pattern("[a-z]+"));
        let t2 = TypeDefinition::derived(q("t2"), t1, Restrictions::new().with_length(2, 3));
        let c = Constraints::from_chain(&t2);

        assert!(c.check_patterns("ab").is_ok());
        assert!(c.check_patterns("AB").is_err());
        assert!(c.check_length("ab", 2).is_ok());
        let err = c.check_length("abcd", 4).unwrap_err();
        assert!(err.to_string().contains("length 2..3"), "{err}");
    }

    /// Innerhalb einer Ebene sind Ranges Alternativen.
    #[test]
    fn ranges_within_level_are_alternatives() {
        let base = TypeDefinition::builtin(BuiltinType::Integer(crate::schema::IntegerKind::Int32));
        let t = TypeDefinition::derived(
            q("t"),
            base,
            Restrictions::new().with_range(1, 5).with_range(10, 20),
        );
        let c = Constraints::from_chain(&t);
        assert!(c.check_range("3", &Number::Integer(3)).is_ok());
        assert!(c.check_range("15", &Number::Integer(15)).is_ok());
        let err = c.check_range("7", &Number::Integer(7)).unwrap_err();
        assert!(err.to_string().contains("1..5 | 10..20"), "{err}");
    }
}

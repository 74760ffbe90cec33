//! Label combiners

use std::collections::BTreeMap;

use super::errors::LabelResult;
use super::expression::LabelExpression;

/// Reduces the distinct labels of one aggregated group to a single label.
///
/// Implementations are shared read-only between cursor copies.
pub trait LabelCombiner: Send + Sync {
    /// Combine `labels` into one expression. An empty input, or input made
    /// only of empty labels, combines to the empty label.
    fn combine(&self, labels: &[&[u8]]) -> LabelResult<Vec<u8>>;
}

/// Requires every contributing label: the result is the conjunction of the
/// inputs, flattened, de-duplicated and sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConjunctiveCombiner;

impl LabelCombiner for ConjunctiveCombiner {
    fn combine(&self, labels: &[&[u8]]) -> LabelResult<Vec<u8>> {
        // rendered conjunct -> needs parentheses when joined with '&'
        let mut conjuncts: BTreeMap<Vec<u8>, bool> = BTreeMap::new();

        for label in labels {
            if let Some(expression) = LabelExpression::parse(label)? {
                collect_conjuncts(expression, &mut conjuncts);
            }
        }

        if conjuncts.len() == 1 {
            return Ok(conjuncts.into_keys().next().unwrap_or_default());
        }

        let mut combined = Vec::new();
        for (i, (conjunct, wrap)) in conjuncts.into_iter().enumerate() {
            if i > 0 {
                combined.push(b'&');
            }
            if wrap {
                combined.push(b'(');
                combined.extend_from_slice(&conjunct);
                combined.push(b')');
            } else {
                combined.extend_from_slice(&conjunct);
            }
        }
        Ok(combined)
    }
}

fn collect_conjuncts(expression: LabelExpression, out: &mut BTreeMap<Vec<u8>, bool>) {
    match expression {
        LabelExpression::And(operands) => {
            for operand in operands {
                collect_conjuncts(operand, out);
            }
        }
        other => {
            let wrap = matches!(other, LabelExpression::Or(_));
            out.insert(other.render(), wrap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combine(labels: &[&str]) -> String {
        let labels: Vec<&[u8]> = labels.iter().map(|l| l.as_bytes()).collect();
        String::from_utf8(ConjunctiveCombiner.combine(&labels).unwrap()).unwrap()
    }

    #[test]
    fn test_single_label_unchanged() {
        assert_eq!(combine(&["A"]), "A");
        assert_eq!(combine(&["B|C"]), "B|C");
    }

    #[test]
    fn test_conjunction_sorted_and_deduplicated() {
        assert_eq!(combine(&["B", "A", "A&B"]), "A&B");
    }

    #[test]
    fn test_disjunctions_parenthesized() {
        assert_eq!(combine(&["A", "B|C"]), "A&(B|C)");
    }

    #[test]
    fn test_empty_labels_dropped() {
        assert_eq!(combine(&["", "A"]), "A");
        assert_eq!(combine(&[""]), "");
        assert_eq!(combine(&[]), "");
    }

    #[test]
    fn test_order_independent() {
        assert_eq!(combine(&["X&Y", "(P|Q)", "Z"]), combine(&["Z", "P|Q", "Y&X"]));
    }

    #[test]
    fn test_malformed_label_fails() {
        let labels = vec![b"A".as_slice(), b"A&|B".as_slice()];
        assert!(ConjunctiveCombiner.combine(&labels).is_err());
    }
}

//! Visibility label expressions
//!
//! Grammar:
//!
//! ```text
//! expression := operand (('&' operand)* | ('|' operand)*)
//! operand    := term | '(' expression ')'
//! term       := [A-Za-z0-9_\-.:/]+
//! ```
//!
//! `&` and `|` never mix at one nesting level without parentheses.

use super::errors::{LabelError, LabelResult};

/// Parsed visibility label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelExpression {
    /// A single security tag
    Term(Vec<u8>),
    /// All operands required
    And(Vec<LabelExpression>),
    /// Any operand sufficient
    Or(Vec<LabelExpression>),
}

impl LabelExpression {
    /// Parse a label. The empty label parses to `None` (unrestricted).
    pub fn parse(label: &[u8]) -> LabelResult<Option<Self>> {
        if label.is_empty() {
            return Ok(None);
        }

        let mut parser = Parser {
            input: label,
            pos: 0,
        };
        let expression = parser.expression()?;
        if parser.pos < label.len() {
            return Err(LabelError::malformed(label, parser.pos, "unbalanced ')'"));
        }
        Ok(Some(expression))
    }

    /// Canonical byte rendering with the minimum parentheses.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut Vec<u8>) {
        match self {
            LabelExpression::Term(term) => out.extend_from_slice(term),
            LabelExpression::And(operands) => render_operands(operands, b'&', out),
            LabelExpression::Or(operands) => render_operands(operands, b'|', out),
        }
    }
}

fn render_operands(operands: &[LabelExpression], operator: u8, out: &mut Vec<u8>) {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            out.push(operator);
        }
        let wrap = match operand {
            LabelExpression::Term(_) => false,
            LabelExpression::And(_) => operator != b'&',
            LabelExpression::Or(_) => operator != b'|',
        };
        if wrap {
            out.push(b'(');
        }
        operand.render_into(out);
        if wrap {
            out.push(b')');
        }
    }
}

fn is_term_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':' | b'/')
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn expression(&mut self) -> LabelResult<LabelExpression> {
        let mut operands = vec![self.operand()?];
        let mut operator: Option<u8> = None;

        while let Some(&b) = self.input.get(self.pos) {
            match b {
                b')' => break,
                b'&' | b'|' => {
                    if operator.is_some_and(|op| op != b) {
                        return Err(LabelError::malformed(
                            self.input,
                            self.pos,
                            "cannot mix '&' and '|' without parentheses",
                        ));
                    }
                    operator = Some(b);
                    self.pos += 1;
                    operands.push(self.operand()?);
                }
                _ => {
                    return Err(LabelError::malformed(self.input, self.pos, "expected operator"));
                }
            }
        }

        Ok(match operator {
            None => operands.remove(0),
            Some(b'&') => LabelExpression::And(operands),
            Some(_) => LabelExpression::Or(operands),
        })
    }

    fn operand(&mut self) -> LabelResult<LabelExpression> {
        if self.input.get(self.pos) == Some(&b'(') {
            let open = self.pos;
            self.pos += 1;
            let inner = self.expression()?;
            if self.input.get(self.pos) != Some(&b')') {
                return Err(LabelError::malformed(self.input, open, "unclosed '('"));
            }
            self.pos += 1;
            return Ok(inner);
        }

        let start = self.pos;
        while self.input.get(self.pos).is_some_and(|b| is_term_byte(*b)) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(LabelError::malformed(self.input, start, "expected term"));
        }
        Ok(LabelExpression::Term(self.input[start..self.pos].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(label: &str) -> LabelExpression {
        LabelExpression::parse(label.as_bytes()).unwrap().unwrap()
    }

    #[test]
    fn test_empty_label_is_unrestricted() {
        assert_eq!(LabelExpression::parse(b"").unwrap(), None);
    }

    #[test]
    fn test_single_term() {
        assert_eq!(parse("PUBLIC"), LabelExpression::Term(b"PUBLIC".to_vec()));
    }

    #[test]
    fn test_nested_rendering() {
        assert_eq!(parse("A&(B|C)").render(), b"A&(B|C)".to_vec());
        assert_eq!(parse("(A&B)&C").render(), b"A&B&C".to_vec());
        assert_eq!(parse("((A))").render(), b"A".to_vec());
    }

    #[test]
    fn test_mixed_operators_rejected() {
        let err = LabelExpression::parse(b"A&B|C").unwrap_err();
        assert!(err.to_string().contains("cannot mix"));
    }

    #[test]
    fn test_malformed_inputs() {
        for label in ["A&", "&A", "(A", "A)", "()", "A B", "A&&B"] {
            assert!(
                LabelExpression::parse(label.as_bytes()).is_err(),
                "'{}' should be rejected",
                label
            );
        }
    }
}

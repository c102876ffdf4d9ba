/// Module to parse chemical formulae into atomic compositions
///
/// Supported notation: element symbols with integer or decimal subscripts (Sr0.98Eu0.02),
/// nested groups with multipliers (Ca(OH)2, K4(Fe(CN)6)), hydrates and other multipart
/// formulae joined by '*' or '·' where every part may carry a leading multiplier (CuSO4*5H2O).
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::synthesis_errors::{SynthesisError, SynthesisResult};

/// element symbol -> number of atoms (may be fractional for doped materials)
pub type Composition = HashMap<String, f64>;

const HYDRATE_SEPARATORS: [char; 2] = ['*', '·'];

static ELEMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]?)([0-9]*\.?[0-9]*)").unwrap());
static GROUP_MULTIPLIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]*").unwrap());
static FRAGMENT_MULTIPLIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([A-Z].*)$").unwrap());

/// How the parser treats characters it cannot interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// stray characters and unmatched ')' are skipped, groups left open are closed with multiplier 1
    #[default]
    Lenient,
    /// any unconsumed non-whitespace character or unbalanced bracket is an error
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaParser {
    mode: ParseMode,
}

impl FormulaParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parses the whole formula: splits it into hydrate fragments, parses every fragment
    /// and sums the atoms of all fragments
    pub fn parse(&self, formula: &str) -> SynthesisResult<Composition> {
        debug!("parsing formula {:?} ({:?} mode)", formula, self.mode);
        let mut total = Composition::new();
        for (offset, fragment) in split_fragments(formula) {
            let parsed = match FRAGMENT_MULTIPLIER.captures(fragment) {
                Some(caps) => {
                    let multiplier = parse_number(&caps[1]).unwrap_or(1.0);
                    let segment = caps.get(2).map_or("", |m| m.as_str());
                    let segment_offset = offset + caps[1].len();
                    let parsed = self.parse_segment(formula, segment_offset, segment)?;
                    multiply_counts(&parsed, multiplier)
                }
                None => self.parse_segment(formula, offset, fragment)?,
            };
            add_counts(&mut total, &parsed);
        }
        debug!("composition of {:?}: {:?}", formula, total);
        Ok(total)
    }

    // one fragment of a formula, i.e. "CuSO4" or "H2O" of "CuSO4*5H2O". Groups are handled with a
    // stack of compositions: '(' opens a new scope, ')' scales it and merges it into its parent
    fn parse_segment(
        &self,
        formula: &str,
        offset: usize,
        segment: &str,
    ) -> SynthesisResult<Composition> {
        let mut stack: Vec<Composition> = Vec::new();
        let mut current = Composition::new();
        let mut i = 0;
        while i < segment.len() {
            let rest = &segment[i..];
            let Some(c) = rest.chars().next() else {
                break;
            };
            match c {
                '(' => {
                    stack.push(std::mem::take(&mut current));
                    i += 1;
                }
                ')' => {
                    i += 1;
                    let digits = GROUP_MULTIPLIER
                        .find(&segment[i..])
                        .map_or("", |m| m.as_str());
                    i += digits.len();
                    let Some(parent) = stack.pop() else {
                        if self.mode == ParseMode::Strict {
                            return Err(SynthesisError::UnbalancedParentheses {
                                formula: formula.to_owned(),
                            });
                        }
                        warn!("unmatched ')' in formula {:?} skipped", formula);
                        continue;
                    };
                    let multiplier = parse_number(digits).unwrap_or(1.0);
                    let closed = std::mem::replace(&mut current, parent);
                    add_counts(&mut current, &multiply_counts(&closed, multiplier));
                }
                _ => {
                    if let Some(caps) = ELEMENT_TOKEN.captures(rest) {
                        let symbol = &caps[1];
                        let subscript = &caps[2];
                        let count = match parse_number(subscript) {
                            Some(count) => count,
                            None if subscript.is_empty() => 1.0,
                            None => {
                                if self.mode == ParseMode::Strict {
                                    return Err(SynthesisError::MalformedFormula {
                                        formula: formula.to_owned(),
                                        position: offset + i + symbol.len(),
                                        character: '.',
                                    });
                                }
                                1.0
                            }
                        };
                        *current.entry(symbol.to_string()).or_insert(0.0) += count;
                        i += caps[0].len();
                    } else if c.is_whitespace() {
                        i += c.len_utf8();
                    } else {
                        if self.mode == ParseMode::Strict {
                            return Err(SynthesisError::MalformedFormula {
                                formula: formula.to_owned(),
                                position: offset + i,
                                character: c,
                            });
                        }
                        debug!("skipping {:?} at position {} of {:?}", c, offset + i, formula);
                        i += c.len_utf8();
                    }
                }
            }
        }

        if !stack.is_empty() {
            if self.mode == ParseMode::Strict {
                return Err(SynthesisError::UnbalancedParentheses {
                    formula: formula.to_owned(),
                });
            }
            warn!(
                "{} unclosed '(' in formula {:?}, closing with multiplier 1",
                stack.len(),
                formula
            );
            while let Some(parent) = stack.pop() {
                let closed = std::mem::replace(&mut current, parent);
                add_counts(&mut current, &closed);
            }
        }
        Ok(current)
    }
}

// fragments of a multipart formula together with their byte offsets in the formula
fn split_fragments(formula: &str) -> Vec<(usize, &str)> {
    let mut fragments = Vec::new();
    let mut start = 0;
    for (i, c) in formula.char_indices() {
        if HYDRATE_SEPARATORS.contains(&c) {
            fragments.push(trimmed_fragment(formula, start, i));
            start = i + c.len_utf8();
        }
    }
    fragments.push(trimmed_fragment(formula, start, formula.len()));
    fragments
}

fn trimmed_fragment(formula: &str, start: usize, end: usize) -> (usize, &str) {
    let fragment = &formula[start..end];
    let trimmed = fragment.trim_start();
    (start + fragment.len() - trimmed.len(), trimmed)
}

// "" and "." are not numbers
fn parse_number(digits: &str) -> Option<f64> {
    if digits.chars().any(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

pub fn multiply_counts(counts: &Composition, factor: f64) -> Composition {
    counts
        .iter()
        .map(|(element, count)| (element.clone(), count * factor))
        .collect()
}

pub fn add_counts(total: &mut Composition, counts: &Composition) {
    for (element, count) in counts {
        *total.entry(element.clone()).or_insert(0.0) += count;
    }
}

/// Parses a formula in lenient mode
pub fn parse_formula(formula: &str) -> SynthesisResult<Composition> {
    FormulaParser::default().parse(formula)
}

pub fn parse_formula_with_mode(formula: &str, mode: ParseMode) -> SynthesisResult<Composition> {
    FormulaParser::new(mode).parse(formula)
}

// Chemical formulae may contain special names for chemical groups i.e. groups of atoms, e.g. Me (methyl) group,
// which is converted into {"C":1, "H":3}. Argument groups should contain the names of these groups and their
// atomic composition { "Me":{"C":1, "H":3}}
pub fn parse_formula_with_groups(
    formula: &str,
    mode: ParseMode,
    groups: &HashMap<String, Composition>,
) -> SynthesisResult<Composition> {
    let counts = FormulaParser::new(mode).parse(formula)?;
    Ok(handle_groups(counts, groups))
}

fn handle_groups(mut counts: Composition, groups: &HashMap<String, Composition>) -> Composition {
    for (chemical_group, atomic_composition) in groups {
        if let Some(number_of_chemical_groups) = counts.remove(chemical_group) {
            add_counts(
                &mut counts,
                &multiply_counts(atomic_composition, number_of_chemical_groups),
            );
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition(pairs: &[(&str, f64)]) -> Composition {
        pairs.iter().map(|(e, c)| (e.to_string(), *c)).collect()
    }

    #[test]
    fn test_parse_formula() {
        assert_eq!(
            parse_formula("H2O").unwrap(),
            composition(&[("H", 2.0), ("O", 1.0)])
        );
        assert_eq!(
            parse_formula("NaCl").unwrap(),
            composition(&[("Na", 1.0), ("Cl", 1.0)])
        );
        assert_eq!(
            parse_formula("C6H8O6").unwrap(),
            composition(&[("C", 6.0), ("H", 8.0), ("O", 6.0)])
        );
        // repeated elements accumulate
        assert_eq!(
            parse_formula("C5H6OOH").unwrap(),
            composition(&[("C", 5.0), ("H", 7.0), ("O", 2.0)])
        );
        assert_eq!(parse_formula("").unwrap(), Composition::new());
    }

    #[test]
    fn test_groups_in_brackets() {
        assert_eq!(
            parse_formula("Ca(OH)2").unwrap(),
            composition(&[("Ca", 1.0), ("O", 2.0), ("H", 2.0)])
        );
        assert_eq!(
            parse_formula("Na(NO3)2").unwrap(),
            composition(&[("Na", 1.0), ("N", 2.0), ("O", 6.0)])
        );
        // no multiplier after the bracket means 1
        assert_eq!(
            parse_formula("H(OH)").unwrap(),
            composition(&[("H", 2.0), ("O", 1.0)])
        );
        // nested groups
        assert_eq!(
            parse_formula("K4(Fe(CN)6)").unwrap(),
            composition(&[("K", 4.0), ("Fe", 1.0), ("C", 6.0), ("N", 6.0)])
        );
        assert_eq!(
            parse_formula("Al2(SO4)3").unwrap(),
            composition(&[("Al", 2.0), ("S", 3.0), ("O", 12.0)])
        );
        assert_eq!(
            parse_formula("((CH3)2)3").unwrap(),
            composition(&[("C", 6.0), ("H", 18.0)])
        );
    }

    #[test]
    fn test_hydrates() {
        assert_eq!(
            parse_formula("CuSO4*5H2O").unwrap(),
            composition(&[("Cu", 1.0), ("S", 1.0), ("O", 9.0), ("H", 10.0)])
        );
        assert_eq!(
            parse_formula("MgSO4·7H2O").unwrap(),
            composition(&[("Mg", 1.0), ("S", 1.0), ("O", 11.0), ("H", 14.0)])
        );
        assert_eq!(
            parse_formula("CuSO4 * 5H2O").unwrap(),
            composition(&[("Cu", 1.0), ("S", 1.0), ("O", 9.0), ("H", 10.0)])
        );
        // a leading number not followed by an element is not a multiplier
        assert_eq!(
            parse_formula("CaSO4*2(H2O)").unwrap(),
            composition(&[("Ca", 1.0), ("S", 1.0), ("O", 5.0), ("H", 2.0)])
        );
    }

    #[test]
    fn test_fractional_subscripts() {
        let parsed = parse_formula("Sr0.98Eu0.02Al2O4").unwrap();
        assert_eq!(parsed["Sr"], 0.98);
        assert_eq!(parsed["Eu"], 0.02);
        assert_eq!(parsed["Al"], 2.0);
        assert_eq!(parsed["O"], 4.0);
        assert_eq!(parse_formula("H2.").unwrap(), composition(&[("H", 2.0)]));
        assert_eq!(parse_formula("H.").unwrap(), composition(&[("H", 1.0)]));
    }

    #[test]
    fn test_lenient_mode_skips_invalid_characters() {
        assert_eq!(
            parse_formula("H2O!").unwrap(),
            composition(&[("H", 2.0), ("O", 1.0)])
        );
        assert_eq!(
            parse_formula("Na$Cl").unwrap(),
            composition(&[("Na", 1.0), ("Cl", 1.0)])
        );
        // unmatched closing bracket is ignored
        assert_eq!(
            parse_formula("NaCl)2").unwrap(),
            composition(&[("Na", 1.0), ("Cl", 1.0)])
        );
        // unclosed bracket is closed at the end of the fragment
        assert_eq!(
            parse_formula("Ca(OH").unwrap(),
            composition(&[("Ca", 1.0), ("O", 1.0), ("H", 1.0)])
        );
    }

    #[test]
    fn test_strict_mode() {
        let strict = FormulaParser::new(ParseMode::Strict);
        assert_eq!(
            strict.parse("Ca (OH)2").unwrap(),
            composition(&[("Ca", 1.0), ("O", 2.0), ("H", 2.0)])
        );
        match strict.parse("H2O!") {
            Err(SynthesisError::MalformedFormula {
                position,
                character,
                ..
            }) => {
                assert_eq!(position, 3);
                assert_eq!(character, '!');
            }
            other => panic!("unexpected result {:?}", other),
        }
        match strict.parse("CuSO4*5H2O#") {
            Err(SynthesisError::MalformedFormula { position, .. }) => assert_eq!(position, 10),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            strict.parse("Ca(OH"),
            Err(SynthesisError::UnbalancedParentheses { .. })
        ));
        assert!(matches!(
            strict.parse("CaOH)2"),
            Err(SynthesisError::UnbalancedParentheses { .. })
        ));
        assert!(matches!(
            strict.parse("H."),
            Err(SynthesisError::MalformedFormula { character: '.', .. })
        ));
    }

    #[test]
    fn test_only_ascii_digits_are_counts() {
        // ARABIC-INDIC DIGIT THREE is not a subscript
        assert_eq!(
            parse_formula("H2\u{0663}").unwrap(),
            composition(&[("H", 2.0)])
        );
        assert_eq!(
            parse_formula("(OH)\u{0663}").unwrap(),
            composition(&[("O", 1.0), ("H", 1.0)])
        );
        match FormulaParser::new(ParseMode::Strict).parse("H2\u{0663}") {
            Err(SynthesisError::MalformedFormula {
                position,
                character,
                ..
            }) => {
                assert_eq!(position, 2);
                assert_eq!(character, '\u{0663}');
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_with_groups() {
        let groups = HashMap::from([(
            "Me".to_string(),
            composition(&[("C", 1.0), ("H", 3.0)]),
        )]);
        assert_eq!(
            parse_formula_with_groups("C6H5Me", ParseMode::Lenient, &groups).unwrap(),
            composition(&[("H", 8.0), ("C", 7.0)])
        );
        assert_eq!(
            parse_formula_with_groups("C6H4(Me)2", ParseMode::Lenient, &groups).unwrap(),
            composition(&[("H", 10.0), ("C", 8.0)])
        );
    }
}

/// Combination of weighted compositions: builds the composition of a target material from
/// the compositions of its precursors and their molar fractions
use std::collections::HashSet;

use super::formula_parser::Composition;

/// Weighted union of compositions. For every (composition, weight) pair each element count
/// is multiplied by the weight and accumulated; if `allowed_elements` is given only these
/// elements are taken into account. Elements never contributed are absent from the result.
pub fn combine_compositions(
    weighted_compositions: &[(Composition, f64)],
    allowed_elements: Option<&HashSet<String>>,
) -> Composition {
    let mut result = Composition::new();
    for (composition, weight) in weighted_compositions {
        for (element, count) in composition {
            if allowed_elements.is_none_or(|allowed| allowed.contains(element)) {
                *result.entry(element.clone()).or_insert(0.0) += count * weight;
            }
        }
    }
    result
}

/// Restriction of a composition to the given elements
pub fn filter_composition(composition: &Composition, elements: &[String]) -> Composition {
    composition
        .iter()
        .filter(|(element, _)| elements.contains(*element))
        .map(|(element, count)| (element.clone(), *count))
        .collect()
}

/// Element counts in alphabetical order, handy for display and for deterministic output
pub fn sorted_counts(composition: &Composition) -> Vec<(&str, f64)> {
    let mut counts: Vec<(&str, f64)> = composition
        .iter()
        .map(|(element, count)| (element.as_str(), *count))
        .collect();
    counts.sort_by(|a, b| a.0.cmp(b.0));
    counts
}

/// "{Al: 2, Eu: 0.02, O: 4, Sr: 0.98}"
pub fn format_composition(composition: &Composition) -> String {
    let entries: Vec<String> = sorted_counts(composition)
        .iter()
        .map(|(element, count)| format!("{}: {}", element, count))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Synthesis::formula_parser::parse_formula;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_composition_unchanged() {
        let caoh = parse_formula("Ca(OH)2").unwrap();
        assert_eq!(combine_compositions(&[(caoh.clone(), 1.0)], None), caoh);
    }

    #[test]
    fn test_weighted_union() {
        let sro = parse_formula("SrO").unwrap();
        let euo = parse_formula("Eu2O3").unwrap();
        let combined = combine_compositions(&[(sro, 0.98), (euo, 0.01)], None);
        assert_relative_eq!(combined["Sr"], 0.98);
        assert_relative_eq!(combined["Eu"], 0.02);
        assert_relative_eq!(combined["O"], 1.01, epsilon = 1e-12);
        assert_eq!(combined.len(), 3);
    }

    #[test]
    fn test_allowed_elements_are_a_subset() {
        let srco3 = parse_formula("SrCO3").unwrap();
        let al2o3 = parse_formula("Al2O3").unwrap();
        let allowed: HashSet<String> = ["Sr", "Al"].iter().map(|e| e.to_string()).collect();
        let combined = combine_compositions(&[(srco3, 1.0), (al2o3, 1.0)], Some(&allowed));
        assert!(combined.keys().all(|element| allowed.contains(element)));
        assert!(!combined.contains_key("O"));
        assert!(!combined.contains_key("C"));
        assert_eq!(combined["Al"], 2.0);
    }

    #[test]
    fn test_filter_composition() {
        let baco3 = parse_formula("BaCO3").unwrap();
        let filtered = filter_composition(&baco3, &["Ba".to_string(), "O".to_string()]);
        assert_eq!(
            filtered,
            Composition::from([("Ba".to_string(), 1.0), ("O".to_string(), 3.0)])
        );
        assert!(filter_composition(&baco3, &[]).is_empty());
    }

    #[test]
    fn test_sorted_counts() {
        let nacl = parse_formula("NaCl").unwrap();
        let counts = sorted_counts(&nacl);
        assert_eq!(counts, vec![("Cl", 1.0), ("Na", 1.0)]);
        assert_eq!(
            format_composition(&parse_formula("Sr0.98Eu0.02Al2O4").unwrap()),
            "{Al: 2, Eu: 0.02, O: 4, Sr: 0.98}"
        );
        assert_eq!(format_composition(&Composition::new()), "{}");
    }
}

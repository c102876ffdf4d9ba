/// Net ionic charge of a composition.
///
/// Polyatomic ions are extracted greedily in the order given by the caller: every ion takes as many
/// whole formula units as the remaining atoms allow, before the next ion is tried. The result is
/// therefore order dependent when ions share elements (NO3 and PO4 both take oxygen), so put the
/// ion that should win first. Atoms left after the extraction contribute oxidation state * count.
use log::debug;
use std::collections::HashMap;

use super::formula_parser::Composition;

#[derive(Debug, Clone, PartialEq)]
pub struct PolyatomicIon {
    pub name: String,
    pub composition: Composition,
    pub charge: f64,
}

impl PolyatomicIon {
    pub fn new(name: &str, composition: &[(&str, f64)], charge: f64) -> Self {
        Self {
            name: name.to_string(),
            composition: composition
                .iter()
                .map(|(element, count)| (element.to_string(), *count))
                .collect(),
            charge,
        }
    }

    // whole formula units of the ion that can be taken from the remaining atoms
    fn extractable_units(&self, remaining: &Composition) -> f64 {
        if self.composition.is_empty() {
            return 0.0;
        }
        self.composition
            .iter()
            .map(|(element, count)| remaining.get(element).copied().unwrap_or(0.0) / count)
            .fold(f64::INFINITY, f64::min)
            .floor()
    }
}

/// nitrate, sulfate, phosphate, in this order of precedence
pub fn default_polyatomic_ions() -> Vec<PolyatomicIon> {
    vec![
        PolyatomicIon::new("NO3", &[("N", 1.0), ("O", 3.0)], -1.0),
        PolyatomicIon::new("SO4", &[("S", 1.0), ("O", 4.0)], -2.0),
        PolyatomicIon::new("PO4", &[("P", 1.0), ("O", 4.0)], -3.0),
    ]
}

pub fn net_charge(
    composition: &Composition,
    oxidation_states: &HashMap<String, f64>,
    polyatomic_ions: &[PolyatomicIon],
) -> f64 {
    let mut total_charge = 0.0;
    let mut remaining = composition.clone();
    for ion in polyatomic_ions {
        let units = ion.extractable_units(&remaining);
        if units >= 1.0 {
            debug!("extracted {} units of {} ({})", units, ion.name, ion.charge);
            total_charge += units * ion.charge;
            for (element, count) in &ion.composition {
                *remaining.entry(element.clone()).or_insert(0.0) -= units * count;
            }
        }
    }
    for (element, count) in &remaining {
        total_charge += oxidation_states.get(element).copied().unwrap_or(0.0) * count;
    }
    total_charge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Synthesis::formula_parser::parse_formula;
    use approx::assert_relative_eq;

    fn states(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(e, s)| (e.to_string(), *s)).collect()
    }

    #[test]
    fn test_neutral_salts() {
        let ions = default_polyatomic_ions();
        let nacl = parse_formula("NaCl").unwrap();
        assert_eq!(net_charge(&nacl, &states(&[("Na", 1.0), ("Cl", -1.0)]), &ions), 0.0);

        let nitrate = parse_formula("Ca(NO3)2").unwrap();
        assert_eq!(net_charge(&nitrate, &states(&[("Ca", 2.0)]), &ions), 0.0);

        let sulfate = parse_formula("Al2(SO4)3").unwrap();
        assert_eq!(net_charge(&sulfate, &states(&[("Al", 3.0)]), &ions), 0.0);
    }

    #[test]
    fn test_doped_composition() {
        let ions = default_polyatomic_ions();
        let doped = parse_formula("Sr0.98Eu0.02Al2O4").unwrap();
        let charge = net_charge(
            &doped,
            &states(&[("Sr", 2.0), ("Eu", 2.0), ("Al", 3.0), ("O", -2.0)]),
            &ions,
        );
        assert_relative_eq!(charge, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_oxidation_state_counts_zero() {
        let ions = default_polyatomic_ions();
        let composition = parse_formula("Na2O").unwrap();
        assert_eq!(net_charge(&composition, &states(&[("Na", 1.0)]), &ions), 2.0);
    }

    #[test]
    fn test_ion_order_matters() {
        // enough oxygen for both ions
        let composition = parse_formula("NPO7").unwrap();
        let nitrate_first = default_polyatomic_ions();
        let phosphate_first: Vec<PolyatomicIon> = nitrate_first.iter().rev().cloned().collect();
        let no_states = HashMap::new();
        // NO3 (-1) then PO4 (-3)
        assert_eq!(net_charge(&composition, &no_states, &nitrate_first), -4.0);
        assert_eq!(net_charge(&composition, &no_states, &phosphate_first), -4.0);

        // NO3 and PO4 compete for oxygen
        let composition = parse_formula("NPO5").unwrap();
        assert_eq!(net_charge(&composition, &no_states, &nitrate_first), -1.0);
        assert_eq!(net_charge(&composition, &no_states, &phosphate_first), -3.0);
    }

    #[test]
    fn test_no_ions() {
        let composition = parse_formula("Fe2O3").unwrap();
        let charge = net_charge(&composition, &states(&[("Fe", 3.0), ("O", -2.0)]), &[]);
        assert_eq!(charge, 0.0);
    }
}

//! # Precursor mass solver
//!
//! ## Aim
//! Finds how many grams of every precursor have to be weighed out to obtain a given mass of a
//! (doped) target material.
//!
//! ## Logic
//! 1. every precursor contributes `fraction(x)` moles per mole of target;
//! 2. the target composition is the weighted union of the precursor compositions restricted to
//!    the elements the precursors are declared to count toward (carrier atoms such as the C and O
//!    of a carbonate are left out);
//! 3. target moles = target mass / molar mass of the target composition;
//! 4. precursor moles = target moles * fraction(x), precursor mass = precursor moles * molar mass
//!    of the precursor restricted to its own element list.
//!
//! ## Usage
//! ```rust, ignore
//! let precursors = vec![
//!     PrecursorSpec::new("SrCO3", FractionRule::expression("1 - x")?, &["Sr"])?,
//!     PrecursorSpec::new("Eu2O3", FractionRule::expression("x/2")?, &["Eu"])?,
//!     PrecursorSpec::new("Al2O3", FractionRule::constant(1.0), &["Al", "O"])?,
//! ];
//! let plan = calculate_precursor_masses(1.0, 0.02, &precursors)?;
//! ```
use log::{debug, info};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::composition::{combine_compositions, filter_composition};
use super::formula_parser::{Composition, FormulaParser, ParseMode};
use super::molar_fraction::{FractionRule, MolarFraction};
use super::molmass::molar_mass;
use super::synthesis_errors::{SynthesisError, SynthesisResult};

/// A precursor: its formula, its molar fraction as a function of x and the elements it
/// contributes to the target
#[derive(Debug, Clone)]
pub struct PrecursorSpec {
    formula: String,
    molar_fraction: FractionRule,
    elements: Vec<String>,
}

impl PrecursorSpec {
    pub fn new(
        formula: &str,
        molar_fraction: FractionRule,
        elements: &[&str],
    ) -> SynthesisResult<Self> {
        if formula.trim().is_empty() {
            return Err(SynthesisError::malformed_precursor(
                formula,
                "formula must not be empty",
            ));
        }
        if let Some(bad) = elements.iter().find(|symbol| !is_element_symbol(symbol)) {
            return Err(SynthesisError::malformed_precursor(
                formula,
                format!("element list must contain element symbols, got {:?}", bad),
            ));
        }
        Ok(Self {
            formula: formula.to_string(),
            molar_fraction,
            elements: elements.iter().map(|symbol| symbol.to_string()).collect(),
        })
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn molar_fraction(&self) -> &FractionRule {
        &self.molar_fraction
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// molar fraction of this precursor at x
    pub fn fraction_at(&self, x: f64) -> SynthesisResult<f64> {
        self.molar_fraction
            .fraction(x)
            .map_err(|reason| SynthesisError::invalid_fraction(&self.formula, reason))
    }
}

fn is_element_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(first), None, None) => first.is_ascii_uppercase(),
        (Some(first), Some(second), None) => {
            first.is_ascii_uppercase() && second.is_ascii_lowercase()
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecursorMass {
    /// grams
    pub mass: f64,
    pub moles: f64,
}

/// Everything computed by one solve
#[derive(Debug, Clone)]
pub struct SynthesisPlan {
    pub target_composition: Composition,
    pub target_molar_mass: f64,
    pub target_moles: f64,
    pub precursor_masses: HashMap<String, PrecursorMass>,
    /// precursor formulae in the order they were given
    pub order: Vec<String>,
}

impl SynthesisPlan {
    /// precursor masses in the order the precursors were given
    pub fn ordered_masses(&self) -> Vec<(&str, PrecursorMass)> {
        self.order
            .iter()
            .filter_map(|formula| {
                self.precursor_masses
                    .get(formula)
                    .map(|mass| (formula.as_str(), *mass))
            })
            .collect()
    }

    pub fn total_mass(&self) -> f64 {
        self.precursor_masses.values().map(|m| m.mass).sum()
    }
}

/// target mass must be positive, x must lie in the open interval (0, 1)
pub fn check_target(target_mass: f64, x: f64) -> SynthesisResult<()> {
    if !(target_mass.is_finite() && target_mass > 0.0) {
        return Err(SynthesisError::InvalidRange {
            quantity: "target mass",
            expected: "a positive number of grams",
            value: target_mass,
        });
    }
    if !(x > 0.0 && x < 1.0) {
        return Err(SynthesisError::InvalidRange {
            quantity: "x",
            expected: "between 0 and 1 (exclusive)",
            value: x,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrecursorMassSolver {
    parser: FormulaParser,
}

impl PrecursorMassSolver {
    pub fn new(mode: ParseMode) -> Self {
        Self {
            parser: FormulaParser::new(mode),
        }
    }

    pub fn solve(
        &self,
        target_mass: f64,
        x: f64,
        precursors: &[PrecursorSpec],
    ) -> SynthesisResult<SynthesisPlan> {
        check_target(target_mass, x)?;

        // Determine the target composition
        let mut allowed_elements: HashSet<String> = HashSet::new();
        let mut weighted_compositions = Vec::with_capacity(precursors.len());
        for precursor in precursors {
            let molar_fraction = precursor.fraction_at(x)?;
            allowed_elements.extend(precursor.elements().iter().cloned());
            let composition = self.parser.parse(precursor.formula())?;
            debug!(
                "precursor {}: molar fraction {} ({}), elements {:?}",
                precursor.formula(),
                molar_fraction,
                precursor.molar_fraction().describe(),
                precursor.elements()
            );
            weighted_compositions.push((composition, molar_fraction));
        }
        let target_composition =
            combine_compositions(&weighted_compositions, Some(&allowed_elements));
        info!(
            "target composition {:?}, allowed elements {:?}",
            target_composition, allowed_elements
        );

        let target_molar_mass = molar_mass(&target_composition)?;
        if target_molar_mass <= 0.0 {
            return Err(SynthesisError::DegenerateTarget);
        }
        let target_moles = target_mass / target_molar_mass;

        let mut precursor_masses = HashMap::new();
        let mut order = Vec::with_capacity(precursors.len());
        for (precursor, (composition, molar_fraction)) in
            precursors.iter().zip(&weighted_compositions)
        {
            let filtered_comp = filter_composition(composition, precursor.elements());
            let precursor_molar_mass = molar_mass(&filtered_comp)?;
            let moles = target_moles * molar_fraction;
            let mass = moles * precursor_molar_mass;
            debug!(
                "precursor {}: {} g, {} mol (molar mass {} g/mol)",
                precursor.formula(),
                mass,
                moles,
                precursor_molar_mass
            );
            if precursor_masses
                .insert(precursor.formula().to_string(), PrecursorMass { mass, moles })
                .is_none()
            {
                order.push(precursor.formula().to_string());
            }
        }

        Ok(SynthesisPlan {
            target_composition,
            target_molar_mass,
            target_moles,
            precursor_masses,
            order,
        })
    }
}

/// Calculates the mass of each precursor needed to synthesize `target_mass` grams of the target
/// compound, parsing formulae in lenient mode
pub fn calculate_precursor_masses(
    target_mass: f64,
    x: f64,
    precursors: &[PrecursorSpec],
) -> SynthesisResult<SynthesisPlan> {
    PrecursorMassSolver::default().solve(target_mass, x, precursors)
}

/// Module to calculate the molar mass of a composition or a chemical formula
///
use log::{debug, info};
use nalgebra::DMatrix;
use std::collections::BTreeSet;

use super::atomic_weights::atomic_weight;
use super::formula_parser::{Composition, FormulaParser, ParseMode};
use super::synthesis_errors::{SynthesisError, SynthesisResult};

/// Sum of atomic weights times counts. Symbols missing from the table of atomic weights are errors
pub fn molar_mass(composition: &Composition) -> SynthesisResult<f64> {
    composition
        .iter()
        .try_fold(0.0, |molar_mass, (element, count)| {
            let weight =
                atomic_weight(element).ok_or_else(|| SynthesisError::unknown_element(element))?;
            Ok(molar_mass + weight * count)
        })
}

// Function to calculate the molar mass of a substance given its chemical formula
pub fn calculate_molar_mass(
    formula: &str,
    mode: ParseMode,
) -> SynthesisResult<(f64, Composition)> {
    let counts = FormulaParser::new(mode).parse(formula)?;
    let molar_mass = molar_mass(&counts)?;
    debug!("molar mass of {}: {} g/mol", formula, molar_mass);
    Ok((molar_mass, counts))
}

// Function to calculate the molar mass of a vector of chemical formulas
pub fn calculate_molar_mass_of_vector_of_subs(
    vec_of_formulae: &[&str],
    mode: ParseMode,
) -> SynthesisResult<Vec<f64>> {
    info!("calculating molar masses of {} substances", vec_of_formulae.len());
    let parser = FormulaParser::new(mode);
    vec_of_formulae
        .iter()
        .map(|formula| molar_mass(&parser.parse(formula)?))
        .collect()
}

/// Matrix of atomic composition: row i holds the atoms of substance i, columns follow the
/// returned (alphabetically sorted) vector of elements
pub fn create_elem_composition_matrix(
    vec_of_formulae: &[&str],
    mode: ParseMode,
) -> SynthesisResult<(DMatrix<f64>, Vec<String>)> {
    let parser = FormulaParser::new(mode);
    let vec_of_compositions = vec_of_formulae
        .iter()
        .map(|formula| parser.parse(formula))
        .collect::<SynthesisResult<Vec<Composition>>>()?;
    // create a unique list of elements from the given formula vector
    let unique_vec_of_elems: Vec<String> = vec_of_compositions
        .iter()
        .flat_map(|counts| counts.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut matrix = DMatrix::zeros(vec_of_compositions.len(), unique_vec_of_elems.len());
    for (substance_i, counts) in vec_of_compositions.iter().enumerate() {
        for (j, element_j) in unique_vec_of_elems.iter().enumerate() {
            if let Some(count) = counts.get(element_j) {
                matrix[(substance_i, j)] = *count;
            }
        }
    }
    Ok((matrix, unique_vec_of_elems))
}

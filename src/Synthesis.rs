/// Table of standard atomic weights (g/mol) of the 118 elements
pub mod atomic_weights;
/// Charge balance: net ionic charge of a composition, polyatomic ions (NO3, SO4, PO4 by default)
/// are extracted first in the order given, the remaining atoms contribute their oxidation states
pub mod charge_balance;
/// Weighted union of element compositions
pub mod composition;
/// Doped material: target mass, doping variable x and precursors, solved on construction,
/// with a table of precursor masses
///
///  # Examples
/// ```rust, ignore
/// use lab_tools::Synthesis::doped_material::DopedMaterial;
/// use lab_tools::Synthesis::molar_fraction::FractionRule;
/// use lab_tools::Synthesis::precursor_solver::PrecursorSpec;
/// let precursors = vec![
///     PrecursorSpec::new("SrCO3", FractionRule::expression("1 - x")?, &["Sr"])?,
///     PrecursorSpec::new("Eu2O3", FractionRule::expression("x/2")?, &["Eu"])?,
///     PrecursorSpec::new("Al2O3", FractionRule::constant(1.0), &["Al", "O"])?,
/// ];
/// let material = DopedMaterial::new(2.0, 0.02, precursors)?;
/// material.print_precursor_masses();
/// ```
pub mod doped_material;
/// Parser of chemical formulae: elements with integer or decimal subscripts, nested brackets,
/// hydrate fragments joined by '*' or '·' with leading multipliers, chemical groups
///
///  # Examples
/// ```
/// use lab_tools::Synthesis::formula_parser::parse_formula;
/// let atomic_composition = parse_formula("Na(NO3)2").unwrap();
/// assert_eq!(atomic_composition["O"], 6.0);
/// ```
pub mod formula_parser;
/// Molar fraction of a precursor as a function of the doping variable x: constants, closures
/// and symbolic expressions
pub mod molar_fraction;
/// Module to calculate the molar mass of a chemical formula and the matrix of atomic composition
///
///  # Examples
/// ```
/// use lab_tools::Synthesis::formula_parser::ParseMode;
/// use lab_tools::Synthesis::molmass::calculate_molar_mass;
/// let (molar_mass, element_composition) = calculate_molar_mass("C6H8O6", ParseMode::Lenient).unwrap();
/// println!("Element counts: {:?}", element_composition);
/// println!("Molar mass: {:?} g/mol", molar_mass);
/// ```
pub mod molmass;
/// Masses of precursors needed for a given mass of target material
pub mod precursor_solver;
pub mod synthesis_errors;

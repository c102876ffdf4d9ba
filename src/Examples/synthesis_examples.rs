use crate::Synthesis::synthesis_errors::SynthesisResult;

pub fn synthesis_examples(task: usize) {
    if let Err(e) = run_example(task) {
        println!("example {} failed: {}", task, e);
    }
}

fn run_example(task: usize) -> SynthesisResult<()> {
    match task {
        0 => {
            // atomic composition, molar masses and matrix of atomic composition
            use crate::Synthesis::formula_parser::{ParseMode, parse_formula};
            use crate::Synthesis::molmass::{
                calculate_molar_mass, calculate_molar_mass_of_vector_of_subs,
                create_elem_composition_matrix,
            };
            let (molar_mass, element_composition) =
                calculate_molar_mass("C6H8O6", ParseMode::Lenient)?;
            println!("Element counts: {:?}", element_composition);
            println!("Molar mass: {:?} g/mol", molar_mass);

            println!("{:?}", parse_formula("Na(NO3)2")?);
            // hydrates
            println!("{:?}", parse_formula("CuSO4*5H2O")?);

            let vec_of_formulae = ["H2O", "NaCl", "C6H8O6", "Ca(NO3)2"];
            let molar_masses = calculate_molar_mass_of_vector_of_subs(&vec_of_formulae, ParseMode::Lenient)?;
            for (formula, molar_mass) in vec_of_formulae.iter().zip(&molar_masses) {
                println!("{}: {:.3} g/mol", formula, molar_mass);
            }
            let (matrix, elements) =
                create_elem_composition_matrix(&["H2O", "NaCl", "C3H8", "CH4"], ParseMode::Lenient)?;
            println!("elements: {:?}", elements);
            println!("{}", matrix);
        }
        1 => {
            // chemical groups and parse modes
            use crate::Synthesis::formula_parser::{
                Composition, ParseMode, parse_formula_with_groups, parse_formula_with_mode,
            };
            use std::collections::HashMap;
            let methyl: Composition = [("C".to_string(), 1.0), ("H".to_string(), 3.0)].into();
            let groups = HashMap::from([("Me".to_string(), methyl)]);
            let composition = parse_formula_with_groups("Me2O", ParseMode::Lenient, &groups)?;
            println!("dimethyl ether: {:?}", composition);
            // strict parsing rejects what lenient parsing skips
            println!("{:?}", parse_formula_with_mode("Ca(OH)2 + ", ParseMode::Lenient)?);
            if let Err(e) = parse_formula_with_mode("Ca(OH)2 + ", ParseMode::Strict) {
                println!("strict mode: {}", e);
            }
        }
        2 => {
            // Sr(1-x)Eu(x)Al2O4 phosphor from carbonate and oxides
            use crate::Synthesis::doped_material::DopedMaterial;
            use crate::Synthesis::molar_fraction::FractionRule;
            use crate::Synthesis::precursor_solver::PrecursorSpec;
            let precursors = vec![
                PrecursorSpec::new("SrCO3", FractionRule::expression("1 - x")?, &["Sr"])?,
                PrecursorSpec::new("Eu2O3", FractionRule::expression("x/2")?, &["Eu"])?,
                PrecursorSpec::new("Al2O3", FractionRule::constant(1.0), &["Al", "O"])?,
            ];
            let material = DopedMaterial::new(2.0, 0.02, precursors)?;
            material.print_precursor_masses();
            // the same batch at higher doping level
            material.with_x(0.05)?.print_precursor_masses();
        }
        3 => {
            // net charge of a doped composition
            use crate::Synthesis::charge_balance::{default_polyatomic_ions, net_charge};
            use crate::Synthesis::formula_parser::parse_formula;
            use std::collections::HashMap;
            let oxidation_states: HashMap<String, f64> =
                [("Sr", 2.0), ("Eu", 3.0), ("Al", 3.0), ("O", -2.0)]
                    .iter()
                    .map(|(e, s)| (e.to_string(), *s))
                    .collect();
            let composition = parse_formula("Sr0.98Eu0.02Al2O4")?;
            let charge = net_charge(&composition, &oxidation_states, &default_polyatomic_ions());
            println!("net charge of Sr0.98Eu0.02Al2O4 with Eu(III): {:.3}", charge);
            let nitrate = parse_formula("Sr(NO3)2")?;
            let charge = net_charge(&nitrate, &oxidation_states, &default_polyatomic_ions());
            println!("net charge of Sr(NO3)2: {}", charge);
        }
        4 => {
            // precursor fractions given by closures
            use crate::Synthesis::molar_fraction::FractionRule;
            use crate::Synthesis::precursor_solver::{PrecursorSpec, calculate_precursor_masses};
            let precursors = vec![
                PrecursorSpec::new("Y2O3", FractionRule::closure("(1 - x)/2", |x| Ok((1.0 - x) / 2.0)), &["Y", "O"])?,
                PrecursorSpec::new("Ce2O3", FractionRule::closure("x/2", |x| Ok(x / 2.0)), &["Ce", "O"])?,
                PrecursorSpec::new("Al2O3", FractionRule::constant(2.5), &["Al", "O"])?,
            ];
            let plan = calculate_precursor_masses(5.0, 0.03, &precursors)?;
            println!("target molar mass {:.3} g/mol", plan.target_molar_mass);
            for (formula, mass) in plan.ordered_masses() {
                println!("{}: {:.4} g, {:.4e} mol", formula, mass.mass, mass.moles);
            }
        }
        _ => println!("no example with number {}", task),
    }
    Ok(())
}

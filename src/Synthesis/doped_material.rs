//! # Doped material
//!
//! A target material of given mass synthesised from a list of precursors at a fixed value of the
//! doping variable x. Construction validates the input and solves for the precursor masses at once,
//! so a `DopedMaterial` always holds a consistent plan. Updating any parameter builds a new value.
//!
//! ```rust, ignore
//! let material = DopedMaterial::new(1.0, 0.02, precursors)?;
//! material.print_precursor_masses();
//! let more = material.with_target_mass(5.0)?;
//! ```
use log::info;
use prettytable::{Cell, Row, Table};
use std::collections::HashMap;

use super::charge_balance::{PolyatomicIon, net_charge};
use super::composition::format_composition;
use super::formula_parser::{Composition, ParseMode};
use super::molar_fraction::MolarFraction;
use super::precursor_solver::{
    PrecursorMass, PrecursorMassSolver, PrecursorSpec, SynthesisPlan, check_target,
};
use super::synthesis_errors::{SynthesisError, SynthesisResult};

pub const DEFAULT_TARGET_MASS: f64 = 1.0;
pub const DEFAULT_X: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct DopedMaterial {
    target_mass: f64,
    x: f64,
    precursors: Vec<PrecursorSpec>,
    mode: ParseMode,
    plan: SynthesisPlan,
}

impl DopedMaterial {
    pub fn new(target_mass: f64, x: f64, precursors: Vec<PrecursorSpec>) -> SynthesisResult<Self> {
        Self::with_mode(target_mass, x, precursors, ParseMode::default())
    }

    pub fn with_mode(
        target_mass: f64,
        x: f64,
        precursors: Vec<PrecursorSpec>,
        mode: ParseMode,
    ) -> SynthesisResult<Self> {
        check_target(target_mass, x)?;
        // a rule that cannot be evaluated at the requested x makes the precursor unusable
        for precursor in &precursors {
            if let Err(reason) = precursor.molar_fraction().fraction(x) {
                return Err(SynthesisError::malformed_precursor(
                    precursor.formula(),
                    format!(
                        "molar fraction {} cannot be evaluated at x = {}: {}",
                        precursor.molar_fraction().describe(),
                        x,
                        reason
                    ),
                ));
            }
        }
        let plan = PrecursorMassSolver::new(mode).solve(target_mass, x, &precursors)?;
        info!(
            "{} g of {} at x = {} requires {:.4} g of precursors",
            target_mass,
            format_composition(&plan.target_composition),
            x,
            plan.total_mass()
        );
        Ok(Self {
            target_mass,
            x,
            precursors,
            mode,
            plan,
        })
    }

    pub fn with_target_mass(&self, target_mass: f64) -> SynthesisResult<Self> {
        Self::with_mode(target_mass, self.x, self.precursors.clone(), self.mode)
    }

    pub fn with_x(&self, x: f64) -> SynthesisResult<Self> {
        Self::with_mode(self.target_mass, x, self.precursors.clone(), self.mode)
    }

    pub fn with_precursors(&self, precursors: Vec<PrecursorSpec>) -> SynthesisResult<Self> {
        Self::with_mode(self.target_mass, self.x, precursors, self.mode)
    }

    pub fn target_mass(&self) -> f64 {
        self.target_mass
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn precursors(&self) -> &[PrecursorSpec] {
        &self.precursors
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn plan(&self) -> &SynthesisPlan {
        &self.plan
    }

    pub fn target_composition(&self) -> &Composition {
        &self.plan.target_composition
    }

    pub fn precursor_masses(&self) -> &HashMap<String, PrecursorMass> {
        &self.plan.precursor_masses
    }

    /// net ionic charge of the target composition
    pub fn net_charge(
        &self,
        oxidation_states: &HashMap<String, f64>,
        polyatomic_ions: &[PolyatomicIon],
    ) -> f64 {
        net_charge(&self.plan.target_composition, oxidation_states, polyatomic_ions)
    }

    /// table of precursor masses, masses with 4 decimals and moles in scientific notation
    pub fn report(&self) -> String {
        self.report_with_precision(4, 4)
    }

    pub fn report_with_precision(&self, mass_decimals: usize, moles_decimals: usize) -> String {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Precursor"),
            Cell::new("Molar fraction"),
            Cell::new("Mass, g"),
            Cell::new("Moles"),
        ]));
        for precursor in &self.precursors {
            // duplicated formulae share one entry in the plan
            let Some(mass) = self.plan.precursor_masses.get(precursor.formula()) else {
                continue;
            };
            table.add_row(Row::new(vec![
                Cell::new(precursor.formula()),
                Cell::new(&precursor.molar_fraction().describe()),
                Cell::new(&format!("{:.*}", mass_decimals, mass.mass)),
                Cell::new(&format!("{:.*e}", moles_decimals, mass.moles)),
            ]));
        }
        format!(
            "To get {} g of {} (x = {}):\n{}",
            self.target_mass,
            format_composition(&self.plan.target_composition),
            self.x,
            table
        )
    }

    pub fn print_precursor_masses(&self) {
        println!("{}", self.report());
    }
}

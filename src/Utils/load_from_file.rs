//! Synthesis task files.
//!
//! A task is a JSON document, either the whole file or the block under a `SYNTHESIS` header line,
//! so that free-form notes may precede it:
//! ```text
//! Europium doped strontium aluminate, batch 3
//! SYNTHESIS
//! {
//!   "target_mass": 2.0,
//!   "x": 0.02,
//!   "precursors": [
//!     { "formula": "SrCO3", "molar_fraction": "1 - x", "elements": ["Sr"] },
//!     { "formula": "Eu2O3", "molar_fraction": "x/2", "elements": ["Eu"] },
//!     { "formula": "Al2O3", "molar_fraction": 1, "elements": ["Al", "O"] }
//!   ],
//!   "oxidation_states": { "Sr": 2, "Eu": 2, "Al": 3, "O": -2 }
//! }
//! ```
//! The block ends at the next header (a line of capitals and underscores) or at the end of file.
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::Synthesis::doped_material::{DEFAULT_TARGET_MASS, DEFAULT_X, DopedMaterial};
use crate::Synthesis::formula_parser::ParseMode;
use crate::Synthesis::molar_fraction::FractionRule;
use crate::Synthesis::precursor_solver::PrecursorSpec;
use crate::Synthesis::synthesis_errors::{SynthesisError, SynthesisResult};

/// a number or an expression in x
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FractionRecord {
    Constant(f64),
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecursorRecord {
    pub formula: String,
    pub molar_fraction: FractionRecord,
    pub elements: Vec<String>,
}

impl PrecursorRecord {
    pub fn to_spec(&self) -> SynthesisResult<PrecursorSpec> {
        let rule = match &self.molar_fraction {
            FractionRecord::Constant(value) => FractionRule::constant(*value),
            FractionRecord::Expression(text) => FractionRule::expression(text)?,
        };
        let elements: Vec<&str> = self.elements.iter().map(String::as_str).collect();
        PrecursorSpec::new(&self.formula, rule, &elements)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisTask {
    #[serde(default = "default_target_mass")]
    pub target_mass: f64,
    #[serde(default = "default_x")]
    pub x: f64,
    pub precursors: Vec<PrecursorRecord>,
    #[serde(default)]
    pub oxidation_states: HashMap<String, f64>,
    /// overrides the parse mode from the settings
    #[serde(default)]
    pub parse_mode: Option<ParseMode>,
}

fn default_target_mass() -> f64 {
    DEFAULT_TARGET_MASS
}

fn default_x() -> f64 {
    DEFAULT_X
}

impl SynthesisTask {
    pub fn precursor_specs(&self) -> SynthesisResult<Vec<PrecursorSpec>> {
        self.precursors.iter().map(PrecursorRecord::to_spec).collect()
    }

    /// solves the task; `default_mode` applies when the task names no parse mode
    pub fn to_material(&self, default_mode: ParseMode) -> SynthesisResult<DopedMaterial> {
        DopedMaterial::with_mode(
            self.target_mass,
            self.x,
            self.precursor_specs()?,
            self.parse_mode.unwrap_or(default_mode),
        )
    }
}

fn is_header(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_uppercase() || c == '_' || c == ' ')
}

/// Reads a synthesis task from a file
pub fn load_synthesis_task(file_name: &str) -> SynthesisResult<SynthesisTask> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(SynthesisError::TaskFile {
            path: file_name.to_string(),
            reason: "file does not exist".to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    let task = parse_synthesis_task(&content).map_err(|reason| SynthesisError::TaskFile {
        path: file_name.to_string(),
        reason,
    })?;
    info!(
        "loaded synthesis task from '{}': {} precursors, {} g at x = {}",
        file_name,
        task.precursors.len(),
        task.target_mass,
        task.x
    );
    Ok(task)
}

/// Parses the text of a task file, errors name the line of the text
pub fn parse_synthesis_task(content: &str) -> Result<SynthesisTask, String> {
    let lines: Vec<&str> = content.lines().collect();

    let header = lines.iter().position(|line| {
        let trimmed = line.trim().to_uppercase();
        trimmed == "SYNTHESIS" || trimmed == "SYNTHESIS TASK"
    });
    let (start_index, end_index) = match header {
        Some(i) => {
            let start = i + 1;
            let end = (start..lines.len())
                .find(|&j| is_header(lines[j].trim()))
                .unwrap_or(lines.len());
            (start, end)
        }
        None => (0, lines.len()),
    };
    let section = lines[start_index..end_index].join("\n");
    if section.trim().is_empty() {
        return Err("no task data found".to_string());
    }

    match serde_json::from_str::<SynthesisTask>(&section) {
        Ok(task) => {
            if task.precursors.is_empty() {
                warn!("synthesis task contains no precursors");
            }
            Ok(task)
        }
        Err(e) => {
            let error_line = e.line().max(1);
            let error_column = e.column();
            // index of the offending line in the whole text
            let actual_line = start_index + error_line - 1;
            let error_msg = format!(
                "error parsing task data at line {}, column {}: {}",
                actual_line + 1,
                error_column,
                e
            );
            error!("{}", error_msg);
            if let Some(problem_line) = lines.get(actual_line) {
                error!("Problematic line: {}", problem_line);
                if error_column >= 1 && error_column <= problem_line.len() {
                    error!("{}^", " ".repeat(error_column - 1));
                }
            }
            Err(error_msg)
        }
    }
}

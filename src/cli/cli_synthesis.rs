use super::cli_main::{get_user_input, prompt};
use crate::Synthesis::charge_balance::default_polyatomic_ions;
use crate::Synthesis::composition::sorted_counts;
use crate::Synthesis::formula_parser::ParseMode;
use crate::Synthesis::molmass::calculate_molar_mass;
use crate::Synthesis::synthesis_errors::SynthesisResult;
use crate::Utils::load_from_file::load_synthesis_task;
use crate::settings::{SynthesisSettings, with_settings, with_settings_mut};
use log::error;
use prettytable::{Cell, Row, Table};

/// Solves a task file and prints the precursor table, the net charge is shown when the task
/// gives oxidation states
pub fn run_task_file(path: &str, settings: &SynthesisSettings) -> SynthesisResult<()> {
    let task = load_synthesis_task(path)?;
    let material = task.to_material(settings.parse_mode)?;
    println!(
        "{}",
        material.report_with_precision(settings.mass_decimals, settings.moles_decimals)
    );
    if !task.oxidation_states.is_empty() {
        let charge = material.net_charge(&task.oxidation_states, &default_polyatomic_ions());
        println!("net charge of the target composition: {:.4}", charge);
    }
    Ok(())
}

pub fn molar_mass_menu() {
    loop {
        prompt("\nEnter a chemical formula (empty line to go back): ");
        let Some(input) = get_user_input() else {
            break;
        };
        let formula = input.trim();
        if formula.is_empty() {
            break;
        }
        let mode = with_settings(|manager| manager.get_settings().parse_mode);
        match calculate_molar_mass(formula, mode) {
            Ok((molar_mass, composition)) => {
                let mut table = Table::new();
                table.add_row(Row::new(vec![Cell::new("Element"), Cell::new("Count")]));
                for (element, count) in sorted_counts(&composition) {
                    table.add_row(Row::new(vec![
                        Cell::new(element),
                        Cell::new(&count.to_string()),
                    ]));
                }
                table.printstd();
                println!("Molar mass of {}: {:.4} g/mol", formula, molar_mass);
            }
            Err(e) => println!("Error: {}", e),
        }
    }
}

pub fn task_file_menu() {
    prompt("\nPath to the synthesis task file: ");
    let Some(input) = get_user_input() else {
        return;
    };
    let settings = with_settings(|manager| manager.get_settings().clone());
    if let Err(e) = run_task_file(input.trim(), &settings) {
        error!("{}", e);
        println!("Error: {}", e);
    }
}

pub fn settings_menu() {
    loop {
        let settings = with_settings(|manager| manager.get_settings().clone());
        println!("\n=== Settings ===");
        println!("1. Parse mode: {:?}", settings.parse_mode);
        println!(
            "2. Precision: {} decimals for masses, {} for moles",
            settings.mass_decimals, settings.moles_decimals
        );
        println!("3. Log level: {} (applies from the next start)", settings.log_level);
        println!(
            "4. Log file: {} (applies from the next start)",
            settings.log_file.as_deref().unwrap_or("none")
        );
        println!("5. Reset to defaults");
        println!("0. Back to main menu");
        prompt("Enter your choice: ");

        let Some(choice) = get_user_input() else {
            break;
        };
        let result = match choice.trim() {
            "1" => {
                let mode = match settings.parse_mode {
                    ParseMode::Lenient => ParseMode::Strict,
                    ParseMode::Strict => ParseMode::Lenient,
                };
                with_settings_mut(|manager| manager.set_parse_mode(mode))
            }
            "2" => match read_precision() {
                Some((mass_decimals, moles_decimals)) => with_settings_mut(|manager| {
                    manager.set_precision(mass_decimals, moles_decimals)
                }),
                None => {
                    println!("Two whole numbers expected, e.g. \"4 4\"");
                    Ok(())
                }
            },
            "3" => {
                prompt("Log level (off, error, warn, info, debug, trace): ");
                match get_user_input() {
                    Some(level) => with_settings_mut(|manager| manager.set_log_level(level.trim())),
                    None => Ok(()),
                }
            }
            "4" => {
                prompt("Log file (empty line to log to the terminal only): ");
                match get_user_input() {
                    Some(path) => {
                        with_settings_mut(|manager| manager.set_log_file(log_file_from_input(&path)))
                    }
                    None => Ok(()),
                }
            }
            "5" => with_settings_mut(|manager| manager.reset_to_defaults()),
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("Error: {}", e);
        }
    }
}

/// An empty line switches the log file off
fn log_file_from_input(input: &str) -> Option<&str> {
    let path = input.trim();
    (!path.is_empty()).then_some(path)
}

fn read_precision() -> Option<(usize, usize)> {
    prompt("Decimals for masses and moles: ");
    let input = get_user_input()?;
    let mut numbers = input.split_whitespace().map(|n| n.parse::<usize>());
    match (numbers.next(), numbers.next(), numbers.next()) {
        (Some(Ok(mass)), Some(Ok(moles)), None) => Some((mass, moles)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_run_task_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{"target_mass": 1.0, "x": 0.1,
                "precursors": [
                    {{"formula": "ZnO", "molar_fraction": "1 - x", "elements": ["Zn", "O"]}},
                    {{"formula": "MnO", "molar_fraction": "x", "elements": ["Mn", "O"]}}
                ],
                "oxidation_states": {{"Zn": 2, "Mn": 2, "O": -2}}}}"#
        )
        .unwrap();
        let settings = SynthesisSettings::default();
        assert!(run_task_file(temp_file.path().to_str().unwrap(), &settings).is_ok());
        assert!(run_task_file("no_such_task.json", &settings).is_err());
    }

    #[test]
    fn test_log_file_from_input() {
        assert_eq!(log_file_from_input("  synthesis.log\n"), Some("synthesis.log"));
        assert_eq!(log_file_from_input("\n"), None);
        assert_eq!(log_file_from_input(""), None);
    }
}

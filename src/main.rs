use lab_tools::Utils::logger::init_logger;
use lab_tools::cli::cli_main::run_interactive_menu;
use lab_tools::cli::cli_synthesis::run_task_file;
use lab_tools::settings::with_settings;
use std::process::ExitCode;

/// `lab_tools` starts the interactive menu, `lab_tools <task.json>` solves one task file
pub fn main() -> ExitCode {
    let settings = with_settings(|manager| manager.get_settings().clone());
    if let Err(e) = init_logger(settings.level_filter(), settings.log_file.as_deref()) {
        eprintln!("logging disabled: {}", e);
    }

    match std::env::args().nth(1) {
        Some(path) => match run_task_file(&path, &settings) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            run_interactive_menu();
            ExitCode::SUCCESS
        }
    }
}

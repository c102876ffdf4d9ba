use super::cli_examples::examples_menu;
use super::cli_synthesis::{molar_mass_menu, settings_menu, task_file_menu};
use std::io::{self, Write};

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let Some(choice) = get_user_input() else {
            break;
        };

        match choice.trim() {
            "1" => molar_mass_menu(),
            "2" => task_file_menu(),
            "3" => settings_menu(),
            "4" => examples_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text
Yellow (\x1b[33m) - Menu options
Cyan (\x1b[36m) - "Enter your choice:" prompt
Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() {
    println!(
        "\x1b[34m\n Welcome to lab_tools: molar masses, compositions of doped materials\n
    and masses of precursors for solid state synthesis \n \x1b[0m"
    );
    println!("\x1b[33m1. Molar mass and composition of a formula\x1b[0m");
    println!("\x1b[33m2. Precursor masses from a synthesis task file\x1b[0m");
    println!("\x1b[33m3. Settings\x1b[0m");
    println!("\x1b[33m4. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("\x1b[36mEnter your choice: \x1b[0m");
}

pub(crate) fn prompt(text: &str) {
    print!("{}", text);
    // a prompt that cannot be flushed is still followed by the input
    let _ = io::stdout().flush();
}

/// None at the end of input
pub(crate) fn get_user_input() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input),
    }
}

use super::cli_main::{get_user_input, prompt};
use crate::Examples::synthesis_examples::synthesis_examples;

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. Molar masses and composition matrix");
        println!("2. Formulae with chemical groups");
        println!("3. Eu doped strontium aluminate");
        println!("4. Net charge of doped compositions");
        println!("5. Ce doped YAG with closure fractions");
        println!("0. Back to main menu");
        prompt("Enter your choice: ");

        let Some(choice) = get_user_input() else {
            break;
        };
        match choice.trim() {
            "0" => break,
            other => match other.parse::<usize>() {
                Ok(task @ 1..=5) => synthesis_examples(task - 1),
                _ => println!("Invalid choice. Please try again."),
            },
        }
    }
}

pub mod synthesis_examples;

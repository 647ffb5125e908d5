//! The `competency init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create competency.toml
    if std::path::Path::new("competency.toml").exists() {
        println!("competency.toml already exists, skipping.");
    } else {
        std::fs::write("competency.toml", SAMPLE_CONFIG)?;
        println!("Created competency.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add questions to banks/example.toml");
    println!("  2. Run: competency validate --bank banks");
    println!("  3. Run: competency generate --output test.json");
    println!("  4. Run: competency score --test test.json --answers answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# competency configuration

bank_path = "./banks"
output_dir = "./competency-results"
questions_per_category = 5
completion_threshold = 75

# Restrict generated tests to these categories (default: all in the bank)
# categories = ["WHS_SAFETY", "TAX_GST"]
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Bank"
description = "A small example bank to get started"

# Optional overrides of the standard pass thresholds
[thresholds]
DOCUMENTATION = 75

[[questions]]
id = "whs_001"
category = "WHS_SAFETY"
subcategory = "Working at Heights"
prompt = "What is the minimum height at which fall protection is required under WHS Regulations?"
question_type = "MULTIPLE_CHOICE"
options = ["1.5 metres", "2 metres", "3 metres", "4 metres"]
correct_answer = "2 metres"
explanation = "WHS Regulations require fall protection for any work at 2 metres or more."
reference = "Work Health and Safety Regulation 2011 - Part 4.4"
difficulty = "basic"
points = 5
time_limit_secs = 45

[[questions]]
id = "tax_001"
category = "TAX_GST"
subcategory = "GST Calculation"
prompt = "Calculate the GST component of a tax invoice showing a total amount of $8,250 (GST inclusive)."
question_type = "CALCULATION"
correct_answer = ["$750", "750"]
explanation = "$8,250 / 11 = $750."
difficulty = "basic"
points = 5
time_limit_secs = 60

[[questions]]
id = "doc_001"
category = "DOCUMENTATION"
subcategory = "Photographic Evidence"
prompt = "TRUE or FALSE: Photos for insurance documentation must include a scale reference and date/time stamp."
question_type = "TRUE_FALSE"
correct_answer = "TRUE"
difficulty = "basic"
points = 5
time_limit_secs = 45
"#;

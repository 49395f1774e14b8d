//! Interactive console menu
//!
//! Reads choices and free text from any `BufRead`, writes to any `Write`.
//! Failures are reported and the loop always returns to the menu.

use crate::crew::FinanceCrew;
use crate::models::ClientProfile;
use crate::Result;
use std::io::{BufRead, Write};
use tracing::debug;

const RULE_WIDTH: usize = 50;

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print an advisory line before the menu starts (e.g. missing API key)
    pub fn advise(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "⚠️  {}", message)?;
        Ok(())
    }

    /// Run the menu until the user exits or input ends
    pub async fn run(&mut self, crew: &FinanceCrew) -> Result<()> {
        writeln!(self.output, "🏦 Welcome to the Finance Crew AI System!")?;
        writeln!(self.output, "{}", "=".repeat(RULE_WIDTH))?;

        loop {
            writeln!(self.output, "\nAvailable Services:")?;
            writeln!(self.output, "1. Company Financial Analysis")?;
            writeln!(self.output, "2. Personal Financial Planning")?;
            writeln!(self.output, "3. Investment Analysis")?;
            writeln!(self.output, "4. Exit")?;

            let Some(choice) = self.prompt("\nSelect a service (1-4): ")? else {
                break;
            };
            debug!(choice = %choice, "Menu selection");

            let keep_going = match choice.as_str() {
                "1" => self.company_analysis(crew).await?,
                "2" => self.personal_planning(crew).await?,
                "3" => self.investment_analysis(crew).await?,
                "4" => {
                    writeln!(self.output, "\nThank you for using Finance Crew AI! 👋")?;
                    false
                }
                _ => {
                    writeln!(self.output, "Invalid choice. Please select 1-4.")?;
                    true
                }
            };

            if !keep_going {
                break;
            }
        }

        self.output.flush()?;
        Ok(())
    }

    async fn company_analysis(&mut self, crew: &FinanceCrew) -> Result<bool> {
        let Some(company) = self.prompt_required(
            "Enter company name for analysis: ",
            "Please enter a valid company name.",
        )?
        else {
            return Ok(false);
        };

        writeln!(self.output, "\n🔍 Running financial analysis for {}...", company)?;
        let result = crew.analyze_company(&company).await;
        self.report("FINANCIAL ANALYSIS RESULTS", result)?;
        Ok(true)
    }

    async fn personal_planning(&mut self, crew: &FinanceCrew) -> Result<bool> {
        writeln!(self.output, "\nPersonal Financial Planning")?;
        writeln!(self.output, "Please provide your financial information:")?;

        let labels = ["Age: ", "Annual income: ", "Current savings: ", "Financial goals: "];
        let mut answers: [String; 4] = Default::default();
        for (slot, label) in answers.iter_mut().zip(labels) {
            match self.prompt_required(label, "This field is required.")? {
                Some(value) => *slot = value,
                None => return Ok(false),
            }
        }

        let [age, income, savings, goals] = answers;
        let profile = ClientProfile {
            age,
            income,
            savings,
            goals,
        };

        writeln!(self.output, "\n💰 Creating personal financial plan...")?;
        let result = crew.plan_personal_finances(&profile.to_string()).await;
        self.report("PERSONAL FINANCIAL PLAN", result)?;
        Ok(true)
    }

    async fn investment_analysis(&mut self, crew: &FinanceCrew) -> Result<bool> {
        let Some(investment) = self.prompt_required(
            "Enter investment details (stock, bond, portfolio): ",
            "Please enter valid investment details.",
        )?
        else {
            return Ok(false);
        };

        writeln!(self.output, "\n📊 Analyzing investment: {}...", investment)?;
        let result = crew.analyze_investment(&investment).await;
        self.report("INVESTMENT ANALYSIS RESULTS", result)?;
        Ok(true)
    }

    fn report(&mut self, title: &str, result: Result<String>) -> Result<()> {
        match result {
            Ok(text) => {
                let rule = "=".repeat(RULE_WIDTH);
                writeln!(self.output, "\n{}\n{}\n{}", rule, title, rule)?;
                writeln!(self.output, "{}", text)?;
            }
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(())
    }

    /// Ask until a non-blank answer arrives. `None` means input ended.
    fn prompt_required(&mut self, label: &str, invalid: &str) -> Result<Option<String>> {
        loop {
            match self.prompt(label)? {
                Some(value) if !value.is_empty() => return Ok(Some(value)),
                Some(_) => writeln!(self.output, "{}", invalid)?,
                None => return Ok(None),
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

//! Offline demo report
//!
//! Walks through persona and task construction and the credential status
//! without contacting the LLM.

use crate::config::Settings;
use crate::crew::FinanceCrew;
use crate::models::Subject;
use crate::Result;
use std::io::Write;

const RULE_WIDTH: usize = 40;
const PREVIEW_CHARS: usize = 80;

/// (service, sample input, what comes back)
pub const USAGE_EXAMPLES: [(&str, &str, &str); 3] = [
    (
        "Company Financial Analysis",
        "Apple Inc.",
        "Comprehensive analysis of AAPL financial health, ratios, and investment potential",
    ),
    (
        "Personal Financial Planning",
        "Age: 30, Income: $75,000, Savings: $25,000, Goals: Buy house in 5 years",
        "Custom budget plan, savings strategy, and timeline for home purchase",
    ),
    (
        "Investment Analysis",
        "Tech-heavy portfolio with FAANG stocks",
        "Risk assessment, diversification recommendations, and optimization strategies",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub passed: usize,
    pub total: usize,
}

/// Write the demo report to `out`
pub fn run_demo<W: Write>(out: &mut W, crew: &FinanceCrew, settings: &Settings) -> Result<DemoSummary> {
    writeln!(out, "🏦 Finance Crew AI - Demo Mode")?;
    writeln!(out, "{}", "=".repeat(50))?;

    let mut passed = 0;
    let total = 3;

    section(out, "🤖 Finance Agents")?;
    let personas = crew.personas().list();
    writeln!(out, "✅ Created all {} agents:", personas.len())?;
    for (i, (_, persona)) in personas.iter().enumerate() {
        writeln!(out, "   {}. {}", i + 1, persona.role)?;
        writeln!(out, "      Goal: {}", preview(&persona.goal))?;
    }
    passed += 1;

    section(out, "📋 Finance Tasks")?;
    match sample_tasks(crew) {
        Ok(descriptions) => {
            writeln!(out, "✅ Created sample tasks:")?;
            for (i, (name, description)) in descriptions.iter().enumerate() {
                writeln!(out, "   {}. {}", i + 1, name)?;
                writeln!(out, "      Description: {}", preview(description))?;
            }
            passed += 1;
        }
        Err(e) => writeln!(out, "❌ Error creating tasks: {}", e)?,
    }

    section(out, "🚀 Crew Pipelines")?;
    let sample = Subject::new("Apple Inc.")?;
    let pipelines = [
        ("analyze_company", crew.company_analysis_pipeline(&sample)),
        ("plan_personal_finances", crew.personal_finance_pipeline(&sample)),
        ("analyze_investment", crew.investment_analysis_pipeline(&sample)),
    ];
    let mut pipelines_ok = true;
    for (name, pipeline) in pipelines {
        match pipeline {
            Ok(pipeline) => {
                let roles: Vec<&str> = pipeline.tasks().iter().map(|t| t.persona.role.as_str()).collect();
                writeln!(out, "   • {} → {}", name, roles.join(" → "))?;
            }
            Err(e) => {
                pipelines_ok = false;
                writeln!(out, "❌ {}: {}", name, e)?;
            }
        }
    }
    if pipelines_ok {
        passed += 1;
    }

    section(out, "🔑 API Setup")?;
    match settings.check_credential() {
        Ok(()) => {
            writeln!(out, "✅ {} is configured", settings.provider.credential_var())?;
            writeln!(out, "   Run the full application with: cargo run --bin finance-crew")?;
        }
        Err(e) => {
            writeln!(out, "⚠️  {}", e)?;
            writeln!(
                out,
                "   Create a .env file with: {}=your_key_here",
                settings.provider.credential_var()
            )?;
        }
    }

    section(out, "💡 Usage Examples")?;
    for (i, (service, input, output)) in USAGE_EXAMPLES.iter().enumerate() {
        writeln!(out, "\n{}. {}", i + 1, service)?;
        writeln!(out, "   Input: {}", input)?;
        writeln!(out, "   Output: {}", output)?;
    }

    writeln!(out, "\n📊 Demo Results: {}/{} components working correctly", passed, total)?;

    Ok(DemoSummary { passed, total })
}

fn sample_tasks(crew: &FinanceCrew) -> Result<Vec<(&'static str, String)>> {
    let analyst = crew.personas().financial_analyst();
    let company = Subject::new("Apple Inc.")?;
    let portfolio = Subject::new("Technology portfolio")?;

    Ok(vec![
        (
            "Financial Analysis Task",
            crew.tasks().financial_analysis(&analyst, &company).description,
        ),
        (
            "Risk Assessment Task",
            crew.tasks().risk_assessment(&analyst, &portfolio).description,
        ),
    ])
}

fn section<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out, "\n{}", title)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    Ok(())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

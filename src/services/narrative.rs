//! Trait and prompt for turning an analysis summary into a written brief.

use anyhow::Result;

use crate::summary::NarrativeSummary;

/// Returned instead of a brief when no API key is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "## API Key Missing\n\nPlease configure your API Key to generate AI insights.";

/// Standing instructions for the text generator.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert Educational Data Analyst specializing in the Kenyan Education System.
Your role is to analyze school exam data and write a concise brief for school leadership.

Key Directives:
1. Use the terminology of the report: \"Mean Score\", \"Mean Grade\", \"Streams\", \"Subject Champions\".
2. Focus on \"Quality Grades\" (C+ and above, which qualify for university entry).
3. Analyze the \"Tail\" (D+ and below) and suggest remedial actions.
4. Be encouraging but strictly data-driven.
5. Format output in clean Markdown.";

/// A text generator that writes a brief from a [`NarrativeSummary`].
#[async_trait::async_trait]
pub trait NarrativeGenerator {
    async fn generate(&self, summary: &NarrativeSummary) -> Result<String>;
}

/// Builds the request prompt: the summary as JSON plus the outline of the
/// expected brief.
pub fn build_prompt(summary: &NarrativeSummary) -> Result<String> {
    let data = serde_json::to_string_pretty(summary)?;
    let grade = summary.school_mean.grade;
    let entries = summary.university_entry_count;
    let total = summary.total_candidates;

    Ok(format!(
        "Analyze the following exam results:

{data}

Generate a \"Principal's Brief\" covering:
1. **Executive Summary**: Overall school performance (Mean Grade {grade}).
2. **Departmental Analysis**: Which subjects are pulling the mean down? Which are the \"Booster\" subjects?
3. **Quality Assurance**: Estimated number of students qualifying for university (C+ and above): {entries} of {total}.
4. **Action Plan**: 3 specific strategies for the Academic Dean to improve the Mean Score by 0.5 points next term.
"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::analyze_text;

    #[test]
    fn test_prompt_embeds_summary() {
        let analysis = analyze_text("Name,Math,Eng\nAnn,80,70\nBen,60,50\n").unwrap();
        let summary = NarrativeSummary::from_analysis(&analysis);
        let prompt = build_prompt(&summary).unwrap();

        assert!(prompt.contains("\"schoolMean\""));
        assert!(prompt.contains("\"topStudent\": \"Ann\""));
        assert!(prompt.contains(&format!("(Mean Grade {})", summary.school_mean.grade)));
        assert!(prompt.contains("2 of 2"));
        assert!(prompt.starts_with("Analyze the following exam results:\n\n{"));
        let outline = prompt.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_digit()));
        assert_eq!(outline.count(), 4);
    }
}

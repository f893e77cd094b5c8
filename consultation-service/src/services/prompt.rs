//! Prompt construction for consultation summaries.
//!
//! Pure functions: a fixed system instruction plus a user message built by
//! interpolating the visit record verbatim. Any string values are accepted,
//! including empty ones.

use crate::models::Visit;
use crate::services::providers::ChatMessage;

/// System instruction sent with every consultation request.
pub const SYSTEM_PROMPT: &str = "\
You are provided with notes written by a doctor from a patient's visit.
Your job is to summarize the visit for the doctor and provide an email.

Reply with exactly three sections using these EXACT headings:

### Summary of visit for the doctor's records

Provide bullet points with the following information:
- Date of Visit: [date]
- Patient Name: [name]
- Chief Complaint: [complaint]
- Assessment/Plan: [assessment and treatment plan]
- Follow-up: [follow-up instructions]
- Additional Notes: [any other relevant notes]

### Next steps for the doctor

Provide 3-5 bullet points with clear, actionable next steps for the doctor:
- [Action item 1]
- [Action item 2]
- [Action item 3]

### Draft of email to patient in patient-friendly language

Subject: [Email subject line]

[Email body with greeting and patient-friendly explanation. Include bullet points where appropriate for instructions or key points.]

IMPORTANT:
- Use bullet points (\u{2022}) for the first two sections
- Each bullet point should be on a new line
- For the email section, write naturally with paragraphs and include bullet points for lists of instructions
";

/// Build the user message for a visit. No escaping, no truncation.
pub fn user_prompt_for(visit: &Visit) -> String {
    format!(
        "Create the summary, next steps and draft email for:\n\
         Patient Name: {}\n\
         Date of Visit: {}\n\
         Notes:\n\
         {}",
        visit.patient_name, visit.date_of_visit, visit.notes
    )
}

/// Build the two-message conversation for a visit: the fixed system
/// instruction followed by the interpolated user message.
pub fn build_messages(visit: &Visit) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt_for(visit)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::ChatRole;

    fn visit(patient_name: &str, date_of_visit: &str, notes: &str) -> Visit {
        Visit {
            patient_name: patient_name.to_string(),
            date_of_visit: date_of_visit.to_string(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn builds_exactly_two_messages() {
        let messages = build_messages(&visit("Jane Roe", "2026-01-15", "BP elevated"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn user_message_interpolates_fields_verbatim() {
        let v = visit(
            "Jane Roe",
            "2026-01-15",
            "Complains of headaches.\nBP 150/95.",
        );
        let prompt = user_prompt_for(&v);
        assert!(prompt.contains("Patient Name: Jane Roe"));
        assert!(prompt.contains("Date of Visit: 2026-01-15"));
        assert!(prompt.contains("Complains of headaches.\nBP 150/95."));
    }

    #[test]
    fn empty_fields_are_accepted() {
        let messages = build_messages(&visit("", "", ""));
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.ends_with("Notes:\n"));
    }

    #[test]
    fn system_prompt_names_the_three_sections() {
        assert!(SYSTEM_PROMPT.contains("### Summary of visit for the doctor's records"));
        assert!(SYSTEM_PROMPT.contains("### Next steps for the doctor"));
        assert!(
            SYSTEM_PROMPT.contains("### Draft of email to patient in patient-friendly language")
        );
    }
}

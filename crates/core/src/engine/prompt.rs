//! Prompt assembly: fixed persona, static clinical report, windowed
//! telemetry, session history, effective input — in that order, so the
//! prompt prefix stays stable across turns.

use sana_llm::provider::ChatMessage;

/// System persona. The report and telemetry placeholders are filled per
/// turn; everything else is fixed.
const PERSONA_TEMPLATE: &str = "You are Samantha's personal health assistant.

User's clinical report:
{user_report}

Simulated smartwatch/health data:
{telemetry}

Instructions:
- Be friendly and conversational, like a supportive human assistant.
- Keep responses short and in points.
- Use plain language and avoid technical jargon.
- Focus on being helpful and approachable.
";

/// Static clinical report embedded into every prompt.
pub const CLINICAL_REPORT: &str = "Patient: Samantha
Age: 45
Diagnosis: Pre-diabetes, hypertension.
Recent labs: Fasting glucose 98 mg/dL, HbA1c 6.0%.
Medications: Metformin 500mg daily.
Notes: Family history of diabetes. Needs to increase physical activity.";

/// Render the system message for one turn.
pub fn system_message(telemetry: &str) -> String {
    PERSONA_TEMPLATE
        .replace("{user_report}", CLINICAL_REPORT)
        .replace("{telemetry}", telemetry)
}

/// Full message list: system, accumulated history, effective input.
pub fn build_messages(
    telemetry: &str,
    history: &[ChatMessage],
    input: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_message(telemetry)));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use sana_llm::provider::Role;

    #[test]
    fn system_message_embeds_report_and_telemetry() {
        let msg = system_message("Heart Rate: 08:00 71 bpm");
        assert!(msg.contains("Patient: Samantha"));
        assert!(msg.contains("Heart Rate: 08:00 71 bpm"));
        assert!(!msg.contains("{user_report}"));
        assert!(!msg.contains("{telemetry}"));
    }

    #[test]
    fn messages_are_ordered_system_history_input() {
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello!"),
        ];
        let msgs = build_messages("data", &history, "what's next?");

        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].content, "hi");
        assert_eq!(msgs[2].content, "hello!");
        assert_eq!(msgs[3].role, Role::User);
        assert_eq!(msgs[3].content, "what's next?");
    }

    #[test]
    fn system_message_is_deterministic() {
        assert_eq!(system_message("same"), system_message("same"));
    }
}

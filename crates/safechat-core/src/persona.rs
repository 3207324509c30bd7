//! Fixed texts that define the assistant and the chat screen.

/// Preamble sent ahead of the conversation on every request.
///
/// Kept byte for byte as the mobile app sends it, trailing spaces included.
pub const SYSTEM_INSTRUCTION: &str = concat!(
    "\n",
    "You are a friendly and approachable AI chatbot for a college anti-ragging app. \n",
    "Help students report incidents anonymously, provide emotional support, and guide them on staying safe. \n",
    "Keep replies short, clear, and empathetic\u{2014}avoid long paragraphs. \n",
    "Ask only one question at a time if needed. \n",
    "Use a calm, warm, and supportive tone in all responses. \n",
    "Focus on the student's concern, give actionable advice, and maintain confidentiality. \n",
    "Keep recent conversation context in mind.\n",
);

/// Bot reply recorded when the provider request fails.
pub const FALLBACK_MESSAGE: &str = "⚠️ Sorry, I couldn’t process your request.";

/// Shown in place of the transcript before the first message.
pub const PLACEHOLDER: &str =
    "🚨 Report anonymously and stay safe! Start chatting to share your concerns.";

pub const TYPING_INDICATOR: &str = "Bot is typing";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_matches_app_prompt() {
        assert!(SYSTEM_INSTRUCTION.starts_with("\nYou are a friendly"));
        assert!(SYSTEM_INSTRUCTION.ends_with("context in mind.\n"));
        assert!(SYSTEM_INSTRUCTION.contains("empathetic\u{2014}avoid long paragraphs. \n"));
        assert_eq!(SYSTEM_INSTRUCTION.lines().count(), 8);
    }
}

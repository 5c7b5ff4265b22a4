//! Fixed instructions sent to the language-model providers.

use crate::model::{AssistantRequest, TranslationRequest};

/// Reply the model should give for questions outside the travel domain.
pub const OFF_TOPIC_REDIRECT: &str = "I'm your Goa travel companion, so I can only help with \
travel in Goa: beaches, places to stay, weather, food, getting around, emergencies and the \
app's translation, weather and nearby-places features. What would you like to know about your trip?";

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a friendly travel assistant inside a Goa \
tourism app. Only answer questions about travelling in Goa: beaches, accommodation, weather, \
local food, transport, safety and emergency contacts, and how to use the app's features \
(phrase translation, live weather, nearby places search). Keep answers under 150 words, \
practical and specific. If a question is unrelated to Goa travel, politely decline and steer \
the user back to trip planning.";

pub fn assistant_system_prompt(req: &AssistantRequest) -> String {
    format!(
        "{ASSISTANT_SYSTEM_PROMPT}\nThe user is currently on the \"{}\" screen.",
        req.context
    )
}

/// Single-turn prompt for providers without a separate system role.
pub fn assistant_prompt(req: &AssistantRequest) -> String {
    format!(
        "{ASSISTANT_SYSTEM_PROMPT}\n\
         If the question is unrelated to Goa travel, reply exactly with: \"{OFF_TOPIC_REDIRECT}\"\n\
         Context: {}\n\
         User: {}\n\
         Assistant:",
        req.context, req.message
    )
}

pub fn translation_prompt(req: &TranslationRequest) -> String {
    format!(
        "Translate the following text from {} to {}. Respond with only the translated text, \
         without quotes, notes or explanations.\n\nText: {}",
        req.from.name(),
        req.to.name(),
        req.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_prompt_names_both_languages() {
        let req = TranslationRequest::new("Where is the beach?", "English", "Hindi");
        let prompt = translation_prompt(&req);
        assert!(prompt.contains("from English to Hindi"));
        assert!(prompt.ends_with("Where is the beach?"));
    }

    #[test]
    fn assistant_prompt_embeds_redirect_and_context() {
        let req = AssistantRequest::new("best beaches?", Some("weather".to_string()));
        let prompt = assistant_prompt(&req);
        assert!(prompt.contains(OFF_TOPIC_REDIRECT));
        assert!(prompt.contains("Context: weather"));
        assert!(prompt.contains("User: best beaches?"));
    }
}

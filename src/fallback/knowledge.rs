use serde::Deserialize;

use crate::fallback::DataError;

const BUILTIN: &str = include_str!("../../data/knowledge.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub name: String,
    keywords: Vec<String>,
    reply: String,
}

impl Topic {
    fn matches(&self, lowered_message: &str) -> bool {
        self.keywords.iter().any(|k| lowered_message.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeReply {
    pub text: String,
    /// Names of matched topics, in check order. Empty for the generic reply.
    pub topics: Vec<String>,
}

/// Keyword-triggered canned replies for the assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBase {
    generic: String,
    #[serde(default)]
    topics: Vec<Topic>,
}

impl KnowledgeBase {
    pub fn builtin() -> Result<Self, DataError> {
        Self::from_toml(BUILTIN)
    }

    pub fn from_toml(source: &str) -> Result<Self, DataError> {
        let mut kb: KnowledgeBase = toml::from_str(source).map_err(|source| DataError::Parse {
            asset: "knowledge",
            source,
        })?;

        if kb.generic.trim().is_empty() {
            return Err(DataError::Invalid {
                asset: "knowledge",
                message: "generic reply is empty".to_string(),
            });
        }

        for topic in &mut kb.topics {
            topic.keywords = topic
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }

        Ok(kb)
    }

    pub fn topic_names(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn generic(&self) -> &str {
        &self.generic
    }

    /// Concatenate the reply of every topic whose keywords occur in the
    /// message; fall back to the generic capability text.
    pub fn answer(&self, message: &str) -> KnowledgeReply {
        let lowered = message.to_lowercase();
        let matched: Vec<&Topic> = self.topics.iter().filter(|t| t.matches(&lowered)).collect();

        if matched.is_empty() {
            return KnowledgeReply {
                text: self.generic.clone(),
                topics: Vec::new(),
            };
        }

        KnowledgeReply {
            text: matched
                .iter()
                .map(|t| t.reply.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            topics: matched.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

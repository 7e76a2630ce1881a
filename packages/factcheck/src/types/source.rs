//! Source items: scraped social media posts.

use serde::{Deserialize, Serialize};

/// A single post. Only the text is mandatory; its identity is its position
/// in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replying_to: Option<Vec<String>>,

    /// Post text
    pub tweet: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Tweet {
    /// Create a post with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            username: None,
            handle: None,
            timestamp: None,
            replying_to: None,
            tweet: text.into(),
            retrieved_by: None,
            followers: None,
            following: None,
            likes: None,
            reposts: None,
            replies: None,
            lang: None,
        }
    }

    /// Post text.
    pub fn text(&self) -> &str {
        &self.tweet
    }
}

/// A scraped dataset of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_by: Option<String>,

    pub tweets: Vec<Tweet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default_to_absent() {
        let json = r#"{"tweets": [{"tweet": "The moon is made of cheese"}]}"#;
        let dataset: Tweets = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.tweets.len(), 1);
        assert_eq!(dataset.tweets[0], Tweet::new("The moon is made of cheese"));
        assert!(dataset.session_id.is_none());
    }

    #[test]
    fn test_full_record_and_unknown_fields() {
        let json = r#"{
            "session_id": "s1",
            "tweets": [{
                "username": "Jane",
                "handle": "@jane",
                "timestamp": "2025-01-20T10:00:00Z",
                "replying_to": ["@bob"],
                "tweet": "Inflation hit 3% last month",
                "followers": 1200,
                "likes": 14,
                "lang": "en",
                "view_count": 99
            }]
        }"#;
        let dataset: Tweets = serde_json::from_str(json).unwrap();
        let tweet = &dataset.tweets[0];
        assert_eq!(tweet.handle.as_deref(), Some("@jane"));
        assert_eq!(tweet.replying_to.as_ref().map(Vec::len), Some(1));
        assert_eq!(tweet.followers, Some(1200));
        assert_eq!(tweet.reposts, None);
    }

    #[test]
    fn test_text_is_mandatory() {
        let json = r#"{"tweets": [{"username": "nobody"}]}"#;
        assert!(serde_json::from_str::<Tweets>(json).is_err());
    }
}

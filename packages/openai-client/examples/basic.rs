//! Basic client usage: one OpenAI call and one Perplexity call with citations.

use openai_client::{ChatRequest, Message, OpenAIClient, Provider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize from environment
    let client = OpenAIClient::from_env()?;

    println!("=== Chat Completion ===");
    let response = client
        .chat_completion(
            ChatRequest::new("gpt-4o")
                .message(Message::system("You are a helpful assistant."))
                .message(Message::user("What is Rust in one sentence?"))
                .temperature(0.7)
                .max_tokens(100),
        )
        .await?;

    println!("Response: {}", response.content);

    println!("\n=== Grounded Completion ===");
    let key = std::env::var(Provider::Perplexity.api_key_var())?;
    let perplexity = OpenAIClient::for_provider(Provider::Perplexity, key);
    let completion = perplexity
        .chat_completion_raw(
            ChatRequest::new("sonar-pro")
                .message(Message::user("When was the Rust 1.0 release?"))
                .output_limit(200),
        )
        .await?;

    println!("Response: {}", completion.content().unwrap_or_default());
    for url in completion.citations.iter().take(3) {
        println!("  - {}", url);
    }

    Ok(())
}

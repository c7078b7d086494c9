//! High-level chat API
//!
//! Convenience functions that feed retrieved context to an OpenAI-compatible
//! chat API, plus an interactive terminal session.

use crate::api::retriever::{DocdexRetriever, SearchRequest, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
};
use async_openai::{Client, config::OpenAIConfig};
use std::io::{self, Write};

/// Answer a single question against the indexed documents.
///
/// Retrieves context with the configured defaults and, when an API key or a
/// custom base URL is supplied, asks the LLM for an answer grounded in that
/// context. Without LLM access (or when the LLM call fails) the retrieved
/// chunks themselves form the answer.
pub async fn quick_query<P: EmbeddingProvider>(
    retriever: &DocdexRetriever<P>,
    query: &str,
    api_key: &str,
    base_url: Option<&str>,
    model: Option<&str>,
) -> Result<String> {
    let response = retriever.search(SearchRequest::new(query)).await?;

    if response.results.is_empty() {
        return Ok("I couldn't find any relevant information in the knowledge base.".to_string());
    }

    if api_key.is_empty() && base_url.is_none() {
        return Ok(context_only_response(&response.results));
    }

    match generate_llm_response(query, &response.context, api_key, base_url, model).await {
        Ok(answer) => Ok(answer),
        Err(e) => {
            log::warn!("LLM API error: {}. Falling back to context-only response.", e);
            Ok(context_only_response(&response.results))
        }
    }
}

/// Generate a context-only answer (fallback when no LLM is available)
fn context_only_response(results: &[SearchResult]) -> String {
    let mut response = "Based on the indexed documents, here's what I found:\n\n".to_string();

    for (i, result) in results.iter().take(3).enumerate() {
        let content = &result.chunk.content;
        let preview = if content.chars().count() > 200 {
            let truncated: String = content.chars().take(200).collect();
            format!("{}...", truncated)
        } else {
            content.clone()
        };
        response.push_str(&format!("{}. {}\n\n", i + 1, preview));
    }

    response.trim().to_string()
}

/// Generate an LLM response using async_openai (supporting OpenAI-compatible APIs)
async fn generate_llm_response(
    query: &str,
    context: &str,
    api_key: &str,
    base_url: Option<&str>,
    model: Option<&str>,
) -> std::result::Result<String, Box<dyn std::error::Error>> {
    let config = if let Some(base_url) = base_url {
        OpenAIConfig::new().with_api_key(api_key).with_api_base(base_url)
    } else {
        OpenAIConfig::new().with_api_key(api_key)
    };

    let client = Client::with_config(config);
    let model_name = model.unwrap_or("gpt-3.5-turbo");

    let system_prompt = "You are a helpful AI assistant with access to an indexed document collection.\n\nWhen answering questions:\n1. Use the provided context from the document collection when relevant\n2. Be clear about what comes from the documents vs. your general knowledge\n3. If the context doesn't contain enough information, say so clearly\n4. Provide helpful, accurate, and concise responses\n\nThe context is selected per question by semantic similarity.";

    let enhanced_message = if context.trim().is_empty() {
        query.to_string()
    } else {
        format!("Context from the document collection:\n{}\n\nUser question: {}", context, query)
    };

    let messages = vec![
        ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(system_prompt.to_string()),
            name: None,
        }),
        ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(enhanced_message),
            name: None,
        }),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model_name)
        .messages(messages)
        .max_tokens(500u16)
        .temperature(0.7)
        .build()?;

    let response = client.chat().create(request).await?;

    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_ref())
        .ok_or("No content in chat response")?;

    Ok(content.clone())
}

/// Interactive chat session over the indexed documents.
///
/// Supports `help`, `stats`, `search <query>`, and `exit`.
pub async fn chat_session<P: EmbeddingProvider>(
    retriever: &DocdexRetriever<P>,
    api_key: &str,
    base_url: Option<&str>,
    model: Option<&str>,
) -> Result<()> {
    println!("Interactive chat mode");
    println!("   Type 'quit' or 'exit' to end the session");
    println!("   Type 'help' for more commands");

    if let Ok(stats) = retriever.store().stats() {
        println!("\nIndex loaded: {} chunks", stats.chunk_count);
        if api_key.is_empty() && base_url.is_none() {
            println!("LLM: Not available (context-only mode)");
        } else if let Some(base_url) = base_url {
            println!("LLM: {} via {}", model.unwrap_or("default"), base_url);
        } else {
            println!("LLM: OpenAI GPT-3.5-turbo");
        }
    }

    println!("{}", "-".repeat(50));

    loop {
        print!("\nYou: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                println!("\nCommands:");
                println!("  search <query> - Show raw search results");
                println!("  stats          - Show index statistics");
                println!("  help           - Show this help");
                println!("  exit/quit      - End session");
                continue;
            }
            "stats" => {
                match retriever.store().stats() {
                    Ok(stats) => {
                        println!("\nIndex statistics:");
                        println!("  Total chunks: {}", stats.chunk_count);
                        println!("  Store size: {} bytes", stats.file_size_bytes);
                    }
                    Err(e) => println!("Error getting stats: {}", e),
                }
                continue;
            }
            _ => {
                if let Some(query) = input.strip_prefix("search ") {
                    println!("\nSearching: '{}'", query);

                    match retriever.retrieve(query, 5, 0.0).await {
                        Ok(results) => {
                            for (i, result) in results.iter().enumerate() {
                                let content = &result.chunk.content;
                                let preview = if content.chars().count() > 100 {
                                    format!("{}...", content.chars().take(100).collect::<String>())
                                } else {
                                    content.clone()
                                };
                                println!(
                                    "{}. [{:.3}] {} - {}",
                                    i + 1,
                                    result.similarity,
                                    result.chunk.name,
                                    preview
                                );
                            }
                        }
                        Err(e) => println!("Search error: {}", e),
                    }
                    continue;
                }

                let start_time = std::time::Instant::now();
                let answer = quick_query(retriever, input, api_key, base_url, model).await?;
                let elapsed = start_time.elapsed();

                println!("\nAssistant: {}", answer);
                println!("[{:.1}s]", elapsed.as_secs_f64());
            }
        }
    }

    Ok(())
}

use evalproxy::{
    cache, logger, CachingTokenizer, CheckpointTokenizer, Client, Config, LocalFileCache,
    TextToImageRequest, TokenizationRequest, VisionClient,
};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let config = Config::from_env()?;
    let cache = cache::open(&config.cache)?;
    let file_cache = Arc::new(LocalFileCache::new(&config.file_cache));

    let prompt = env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let prompt = if prompt.is_empty() {
        "An astronaut riding a horse".to_string()
    } else {
        prompt
    };

    let client = VisionClient::new(cache.clone(), file_cache);
    let request = TextToImageRequest::new("AlephAlpha/m-vader", prompt.as_str());

    log::info!("Resolving text-to-image request for {:?}", prompt);
    let result = client.make_request(&request.into()).await?;
    if result.success {
        log::info!("Found {} cached image(s)", result.completions.len());
    } else if let Some(error) = &result.error {
        log::warn!("{}", error);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(tokenizer_config) = &config.tokenizer {
        let tokenizer = CheckpointTokenizer::new(cache.clone(), tokenizer_config)?;
        let request = TokenizationRequest::new(prompt.as_str(), tokenizer_config.name.as_str())
            .encoding(true);
        let tokenized = tokenizer.tokenize(&request).await?;
        log::info!(
            "Prompt is {} tokens on {}",
            tokenized.tokens.len(),
            tokenizer.device()
        );
    }

    let stats = cache.stats();
    log::info!(
        "Cache stats: {} hits, {} misses, {} writes",
        stats.hits,
        stats.misses,
        stats.writes
    );

    Ok(())
}

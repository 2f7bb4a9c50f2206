//! Token commands: mint a tracking link or inspect an existing token

use colored::Colorize;

use crate::errors::{LinkTrkrError, Result};
use crate::services::build_link;
use crate::token::{OwnerId, TokenCodec, TrackingClaim};
use crate::utils::url_validator::{validate_url, validation_error_message};

/// 签发 token，给了 domain 时打印完整链接
pub fn create_token(url: &str, owner: &str, ttl: Option<u64>, domain: Option<&str>) -> Result<()> {
    let codec = codec_from_config()?;
    let url = url.trim();
    validate_url(url).map_err(|e| LinkTrkrError::validation(validation_error_message(&e)))?;

    let Ok(owner) = owner.parse::<OwnerId>();
    let ttl = ttl.or(codec.default_ttl_secs());
    let token = codec.encode(&TrackingClaim::new(url, owner.clone()), ttl)?;

    match domain {
        Some(domain) => println!("{}", build_link(domain, &token)),
        None => println!("{}", token),
    }
    eprintln!(
        "{} {} {} {}",
        "owner:".dimmed(),
        owner.to_string().cyan(),
        "expires:".dimmed(),
        ttl.map_or_else(|| "never".to_string(), |secs| format!("in {}s", secs))
            .cyan()
    );
    Ok(())
}

/// 验证 token 并打印声明内容
pub fn inspect_token(token: &str) -> Result<()> {
    let codec = codec_from_config()?;
    let claim = codec.decode(token.trim())?;

    println!("{} {}", "Valid token".green().bold(), "✔".green());
    println!("  {} {}", "url:".yellow(), claim.url);
    println!("  {} {}", "owner:".yellow(), claim.owner_id);
    if let Some(issued_at) = claim.issued_at {
        println!("  {} {}", "issued:".yellow(), issued_at.to_rfc3339());
    }
    println!(
        "  {} {}",
        "expires:".yellow(),
        claim
            .expires_at
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
    );
    Ok(())
}

fn codec_from_config() -> Result<TokenCodec> {
    let config = crate::config::get_config();
    if config.token.secret.is_empty() {
        return Err(LinkTrkrError::config(
            "token.secret is required (LT__TOKEN__SECRET)",
        ));
    }
    Ok(TokenCodec::from_config())
}

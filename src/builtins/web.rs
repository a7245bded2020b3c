use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

const TAVILY_URL: &str = "https://api.tavily.com/search";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// 预编译正则表达式（移除 script 标签）
static SCRIPT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script[^>]*>.*?</script>").unwrap());

/// 预编译正则表达式（移除 style 标签）
static STYLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<style[^>]*>.*?</style>").unwrap());

static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static MULTIPLE_NEWLINES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Tavily 搜索，每条结果一个字符串
pub async fn search(query: &str) -> Result<Vec<String>> {
    let api_key = std::env::var("TAVILY_API_KEY").context("TAVILY_API_KEY is not set")?;

    let body = serde_json::json!({
        "api_key": api_key,
        "query": query,
        "search_depth": "basic",
        "include_answer": true
    });

    let response = HTTP_CLIENT
        .post(TAVILY_URL)
        .json(&body)
        .send()
        .await
        .context("failed to send search request")?;

    let status = response.status();
    let text = response.text().await.context("failed to read search response")?;

    if !status.is_success() {
        return Err(anyhow!("search API error: {} - {}", status, text));
    }

    let result: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse search response: {}", text))?;

    let mut output = Vec::new();

    if let Some(answer) = result.get("answer").and_then(|v| v.as_str()) {
        output.push(format!("Summary: {}", answer));
    }

    if let Some(results) = result.get("results").and_then(|v| v.as_array()) {
        for (i, item) in results.iter().take(5).enumerate() {
            let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("(untitled)");
            let url = item.get("url").and_then(|v| v.as_str()).unwrap_or("(no url)");
            let content = item.get("content").and_then(|v| v.as_str()).unwrap_or("");

            output.push(format!("{}. {}\n   URL: {}\n   {}", i + 1, title, url, content));
        }
    }

    if output.is_empty() {
        output.push("No results found".to_string());
    }
    Ok(output)
}

pub async fn fetch(url: &str) -> Result<String> {
    let response = HTTP_CLIENT
        .get(url)
        .header("User-Agent", "Mozilla/5.0 (compatible; action-gateway/0.1)")
        .send()
        .await
        .with_context(|| format!("request failed: {}", url))?;

    let status = response.status();
    let text = response.text().await.context("failed to read response body")?;

    if !status.is_success() {
        return Err(anyhow!("HTTP error: {} - {}", status, url));
    }

    Ok(html_to_text(&text))
}

fn html_to_text(html: &str) -> String {
    let mut result = SCRIPT_REGEX.replace_all(html, "").to_string();
    result = STYLE_REGEX.replace_all(&result, "").to_string();
    result = HTML_TAG_REGEX.replace_all(&result, "").to_string();

    result = result
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    result = MULTIPLE_NEWLINES_REGEX
        .replace_all(&result, "\n\n")
        .to_string();

    result.trim().to_string()
}

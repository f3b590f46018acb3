use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use routewright::mock::MOCKS_PATH;

#[derive(Parser)]
#[command(name = "mock-cli")]
#[command(about = "Register and inspect mocks on a server running in e2e testing mode", long_about = None)]
struct Cli {
    #[arg(short = 'H', long, default_value = "http://localhost:3000")]
    host: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a mock
    Register {
        /// Exact request URL to answer, including the query string
        #[arg(long)]
        url: String,

        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(short, long, default_value_t = 200)]
        status: u16,

        /// Response body; parsed as JSON when possible
        #[arg(short, long, default_value = "")]
        response: String,

        /// Expected request body (JSON)
        #[arg(long)]
        postdata: Option<String>,

        /// Match request bodies partially; empty strings act as wildcards
        #[arg(long)]
        match_empty: bool,

        /// Remove the mock after its first hit
        #[arg(long)]
        once: bool,
    },
    /// Ask the server to log every registered mock
    Dump,
}

fn parse_lenient(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let endpoint = format!("{}{}", cli.host.trim_end_matches('/'), MOCKS_PATH);

    match cli.command {
        Commands::Register {
            url,
            method,
            status,
            response,
            postdata,
            match_empty,
            once,
        } => {
            let mut mock = Map::new();
            mock.insert("url".into(), json!(url));
            mock.insert("method".into(), json!(method));
            mock.insert("statusCode".into(), json!(status));
            mock.insert("response".into(), parse_lenient(&response));
            mock.insert("matchEmpty".into(), json!(match_empty));
            mock.insert("persist".into(), json!(!once));
            if let Some(postdata) = postdata {
                mock.insert("postdata".into(), serde_json::from_str::<Value>(&postdata)?);
            }

            let res = client.post(&endpoint).json(&Value::Object(mock)).send().await?;
            report(res, "Mock registered").await?;
        }
        Commands::Dump => {
            let res = client.get(&endpoint).send().await?;
            report(res, "Mocks written to the server log").await?;
        }
    }

    Ok(())
}

async fn report(res: reqwest::Response, success: &str) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("mock API returned status {}: {}", status, text).into());
    }

    println!("{}", success);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;

    fn response(status: u16, body: &str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_report_fails_on_error_status() {
        let err = report(response(404, "{\"status\":404}"), "ok").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_report_accepts_success() {
        assert!(report(response(200, ""), "ok").await.is_ok());
    }
}

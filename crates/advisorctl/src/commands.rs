//! Command implementations for advisorctl.

use advisor_common::config::AdvisorConfig;
use advisor_common::decision_log::DecisionLog;
use advisor_common::engine::AdvisorEngine;
use advisor_common::generative::{GenerativeClient, HttpGenerativeClient, StaticGenerativeClient};
use advisor_common::knowledge::KnowledgeBase;
use advisor_common::people::{HttpPeopleSearchClient, PeopleSearchClient, StaticPeopleSearchClient};
use advisor_common::types::AdvisorResponse;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Locate the config: explicit flag, then XDG config dir, then defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AdvisorConfig> {
    if let Some(path) = explicit {
        return AdvisorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    let default_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("advisor/config.toml");
    AdvisorConfig::load_or_default(&default_path)
        .with_context(|| format!("loading config {}", default_path.display()))
}

fn build_engine(config: &AdvisorConfig) -> Result<AdvisorEngine> {
    let kb = KnowledgeBase::load_json(&config.catalog_path)
        .with_context(|| format!("loading catalog {}", config.catalog_path.display()))?;

    let generative: Box<dyn GenerativeClient> = match HttpGenerativeClient::new(config.generative.clone()) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "generative client unavailable; fallback answers disabled");
            Box::new(StaticGenerativeClient::unavailable())
        }
    };

    let people: Box<dyn PeopleSearchClient> = match &config.people_endpoint {
        Some(endpoint) => {
            match HttpPeopleSearchClient::new(endpoint.clone(), config.people_timeout_secs) {
                Ok(client) => Box::new(client),
                Err(e) => {
                    tracing::warn!(error = %e, "people-search client unavailable");
                    Box::new(StaticPeopleSearchClient::unavailable())
                }
            }
        }
        None => Box::new(StaticPeopleSearchClient::unavailable()),
    };

    Ok(AdvisorEngine::new(
        kb,
        generative,
        people,
        DecisionLog::new(config.decision_log_path.clone()),
    ))
}

pub fn ask(
    config: &AdvisorConfig,
    question: &str,
    session: Option<String>,
    json: bool,
) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("empty question");
    }
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut engine = build_engine(config)?;
    let response = engine.process_query(&session_id, question);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

pub fn repl(config: &AdvisorConfig) -> Result<()> {
    let mut engine = build_engine(config)?;
    let session_id = uuid::Uuid::new_v4().to_string();

    println!(
        "{}",
        "Advisor REPL. Ask about courses, tracks, or your semester plan.".bold()
    );
    println!("Statements like \"I passed CS 18000\" are remembered. \"exit\" to quit.\n");

    let stdin = std::io::stdin();
    loop {
        print!("{} ", ">".cyan());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            break;
        }

        let response = engine.process_query(&session_id, line);
        print_response(&response);
        println!();
    }
    Ok(())
}

pub fn check(config: &AdvisorConfig, path: Option<PathBuf>) -> Result<()> {
    let catalog_path = path.unwrap_or_else(|| config.catalog_path.clone());
    match KnowledgeBase::load_json(&catalog_path) {
        Ok(kb) => {
            println!("{} {}", "ok".green().bold(), catalog_path.display());
            println!("  courses:   {}", kb.course_count());
            println!("  tracks:    {}", kb.track_count());
            println!("  templates: {}", kb.template_count());
            let depts: Vec<&str> = kb.departments().collect();
            println!("  departments: {}", depts.join(", "));
            if kb.codo_requirements().is_none() {
                println!("  {}", "note: no CODO requirements defined".yellow());
            }
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "invalid".red().bold(), catalog_path.display());
            println!("  {e}");
            std::process::exit(1);
        }
    }
}

fn print_response(response: &AdvisorResponse) {
    println!("{}", response.response_text);
    let meta = format!(
        "[source: {} | confidence: {:.2}{}]",
        response.source_tag,
        response.confidence,
        response
            .matched_track
            .as_deref()
            .map(|t| format!(" | track: {t}"))
            .unwrap_or_default()
    );
    if response.source_tag.is_grounded() {
        println!("{}", meta.dimmed());
    } else {
        println!("{}", meta.yellow());
    }
}

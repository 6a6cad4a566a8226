use std::path::Path;

use anyhow::Context;
use clap::Parser;

mod classifier;
mod cli;
mod config;
mod email;
mod linkcheck;
mod report;

use classifier::PhishClassifier;
use config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let base_path = config::base_path()?;
    let config = Config::load_with(&base_path);

    match args.command {
        cli::Command::Scan {
            files,
            json,
            output,
            neighbors,
        } => {
            let mut classifier_config = config.classifier.clone();
            if let Some(k) = neighbors {
                classifier_config.neighbors = k;
            }
            let classifier = PhishClassifier::new(classifier_config, base_path);

            let mut records = Vec::new();
            for file in &files {
                let path = Path::new(file);
                if !path.exists() {
                    eprintln!("File not found: {}", file);
                    continue;
                }

                let content = email::read_email(path)
                    .with_context(|| format!("failed to read {}", file))?;
                let exclude = classifier.exclusion_for(file);
                let verdict = classifier.classify(&content.embedding_text(), exclude.as_deref())?;
                let mismatch = linkcheck::url_mismatch(&content.html_body);

                let record = report::ScanRecord::new(file, mismatch, &verdict, exclude.is_some());
                if !json {
                    println!("{}", record.summary_line());
                }
                records.push(record);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records).unwrap());
            } else if files.len() > 1 {
                let phishing_count = records.iter().filter(|r| r.is_phishing).count();
                println!("\n--- {}/{} phishing ---", phishing_count, records.len());
            }

            let output_path = output.unwrap_or_else(|| report::DEFAULT_RESULTS_FILE.to_string());
            report::save_results(Path::new(&output_path), &records)
                .with_context(|| format!("failed to write {}", output_path))?;
            log::info!("Results saved to {}", output_path);

            Ok(())
        }

        cli::Command::Evaluate {} => {
            let classifier = PhishClassifier::new(config.classifier.clone(), base_path);

            let mut correct = 0usize;
            let mut total = 0usize;

            for def in classifier.defs().to_vec() {
                let path = Path::new(def.identifier);
                let Ok(content) = email::read_email(path) else {
                    println!("SKIP | {} (source not readable)", def.identifier);
                    continue;
                };

                let verdict =
                    classifier.classify(&content.embedding_text(), Some(def.identifier))?;
                let ok = verdict.is_phishing == def.is_phishing;
                total += 1;
                if ok {
                    correct += 1;
                }

                println!(
                    "{} | {} | expected {}, got {} ({:.1}%)",
                    if ok { "PASS" } else { "FAIL" },
                    def.identifier,
                    verdict_label(def.is_phishing),
                    verdict_label(verdict.is_phishing),
                    verdict.confidence * 100.0
                );
            }

            if total > 0 {
                println!(
                    "\n{}/{} correct ({:.1}%)",
                    correct,
                    total,
                    correct as f64 / total as f64 * 100.0
                );
            } else {
                println!("No labeled examples could be resolved");
            }

            Ok(())
        }

        cli::Command::Examples {} => {
            for def in classifier::LABELED_EXAMPLES {
                let resolvable = Path::new(def.identifier).exists();
                println!(
                    "{} | {} | {} | {}",
                    if def.is_phishing { "PHISH" } else { "LEGIT" },
                    def.identifier,
                    def.category_label,
                    if resolvable { "ok" } else { "missing" }
                );
            }
            Ok(())
        }
    }
}

fn verdict_label(is_phishing: bool) -> &'static str {
    if is_phishing {
        "phishing"
    } else {
        "legitimate"
    }
}

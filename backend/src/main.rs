//! SylvaScan CLI - Grow the forest knowledge graph from analysis results
//!
//! # Main Commands
//!
//! ```bash
//! sylvascan serve                   # Start HTTP server (port 8000)
//! sylvascan process result.json     # Fold an analysis result into the graph
//! sylvascan suggest result.json     # Preview updates without applying them
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! sylvascan validate result.json    # Validate JSON against the schema
//! sylvascan show "masson pine"      # Show what the graph knows about an entity
//! sylvascan relations               # List valid relation labels
//! sylvascan features <entity> f.json # Upsert visual features of an entity
//! sylvascan example-result          # Print an example analysis result
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use sylvascan::{
    validate_analysis_result, AiClient, AnalysisResult, EntityFeatures, KnowledgeStore,
    KnowledgeUpdater, UpdateOptions, ValidationError, DEFAULT_DB_PATH,
};

#[derive(Parser)]
#[command(name = "sylvascan")]
#[command(about = "Forest pest & disease knowledge graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold an analysis result into the knowledge graph
    Process {
        /// Analysis result JSON file
        input: PathBuf,

        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,

        /// Skip AI relation discovery
        #[arg(long)]
        no_inference: bool,

        /// Output file for run statistics (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview what a run would change, without touching the graph
    Suggest {
        /// Analysis result JSON file
        input: PathBuf,

        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an analysis result against the schema
    Validate {
        /// Analysis result JSON file
        input: PathBuf,
    },

    /// Show what the graph knows about one entity
    Show {
        /// Entity name
        name: String,

        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,
    },

    /// List the relation labels AI discovery may answer with
    Relations {
        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,
    },

    /// Upsert visual features of an entity
    Features {
        /// Entity name
        name: String,

        /// Features JSON file
        input: PathBuf,

        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,
    },

    /// Create the knowledge store and seed default relations
    Init {
        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,
    },

    /// Print an example analysis result
    ExampleResult,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Knowledge store path
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            db,
            no_inference,
            output,
        } => cmd_process(&input, &db, no_inference, output.as_deref()).await,

        Commands::Suggest { input, db, output } => {
            cmd_suggest(&input, &db, output.as_deref()).await
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Show { name, db } => cmd_show(&name, &db).await,

        Commands::Relations { db } => cmd_relations(&db).await,

        Commands::Features { name, input, db } => cmd_features(&name, &input, &db).await,

        Commands::Init { db } => cmd_init(&db).await,

        Commands::ExampleResult => cmd_example_result(),

        Commands::Serve { port, db } => cmd_serve(port, &db).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_process(
    input: &Path,
    db: &str,
    no_inference: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading analysis result: {}", input.display());

    let content = fs::read_to_string(input)?;
    let payload: Value = serde_json::from_str(&content)?;

    let store = KnowledgeStore::open(db).await?;
    store.seed_default_relations().await?;

    let options = UpdateOptions {
        infer_relations: !no_inference,
        ..UpdateOptions::default()
    };

    let mut updater = KnowledgeUpdater::new(store).with_options(options);
    if no_inference {
        eprintln!("   AI relation discovery disabled (--no-inference)");
    } else {
        match AiClient::from_env() {
            Ok(client) => {
                eprintln!("🤖 AI relation discovery enabled ({})", client.model());
                updater = updater.with_ai(client);
            }
            Err(_) => eprintln!("⚠️  ANTHROPIC_API_KEY not set, skipping AI relation discovery"),
        }
    }

    let stats = updater.process_value(&payload).await?;

    eprintln!("\n📊 Results:");
    eprintln!("   New entities:       {}", stats.new_entities_added);
    eprintln!("   New relations:      {}", stats.new_relations_added);
    eprintln!("   Features refreshed: {}", stats.features_updated);
    eprintln!("   Skipped (low conf): {}", stats.skipped_low_confidence);

    let json = serde_json::to_string_pretty(&stats)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_suggest(
    input: &Path,
    db: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("💡 Suggesting updates for: {}", input.display());

    let content = fs::read_to_string(input)?;
    let result: AnalysisResult = serde_json::from_str(&content)?;

    let store = KnowledgeStore::open(db).await?;
    let updater = KnowledgeUpdater::new(store);

    let suggestions = updater.suggestions(&result);
    if suggestions.is_empty() {
        eprintln!("   Nothing to suggest for this result.");
        return Ok(());
    }

    eprintln!("   {} suggestion(s)", suggestions.len());
    let json = serde_json::to_string_pretty(&suggestions)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let value: Value = serde_json::from_str(&content)?;

    match validate_analysis_result(&value) {
        Ok(()) => {
            eprintln!("✅ Analysis result is valid");
            Ok(())
        }
        Err(ValidationError::SchemaError { errors }) => {
            eprintln!("❌ Invalid analysis result:");
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn cmd_show(name: &str, db: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = KnowledgeStore::open(db).await?;

    let triples = store.triples_for(name).await?;
    let features = store.features_for(name).await?;

    if triples.is_empty() && features.is_empty() {
        return Err(format!("Entity not found: {}", name).into());
    }

    println!("🌲 {}", name);

    if !triples.is_empty() {
        println!("\nTriples:");
        for t in &triples {
            println!("  {} --[{}]--> {}", t.head, t.relation, t.tail);
        }
    }

    if !features.is_empty() {
        println!("\nFeatures:");
        for f in &features {
            println!("  {} = {} (confidence {:.2})", f.feature, f.value, f.confidence);
        }
    }

    Ok(())
}

async fn cmd_relations(db: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = KnowledgeStore::open(db).await?;

    let relations = store.valid_relations().await?;
    if relations.is_empty() {
        eprintln!("📋 No relations seeded yet.");
        eprintln!("   Use 'sylvascan init' to seed the defaults.");
        return Ok(());
    }

    eprintln!("📋 Valid relations ({}):", relations.len());
    for relation in relations {
        println!("  - {}", relation);
    }

    Ok(())
}

async fn cmd_features(
    name: &str,
    input: &Path,
    db: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔧 Updating features of '{}'", name);

    let content = fs::read_to_string(input)?;
    let features: EntityFeatures = serde_json::from_str(&content)?;

    let store = KnowledgeStore::open(db).await?;
    let updater = KnowledgeUpdater::new(store);

    let count = updater.update_entity_features(name, &features).await?;
    eprintln!("✅ {} feature(s) written", count);

    Ok(())
}

async fn cmd_init(db: &str) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🌲 Initializing knowledge store: {}", db);

    let store = KnowledgeStore::open(db).await?;
    let seeded = store.seed_default_relations().await?;

    eprintln!(
        "✅ Store ready: {} relation(s) seeded, {} triple(s) stored",
        seeded,
        store.triple_count().await?
    );

    Ok(())
}

fn cmd_example_result() -> Result<(), Box<dyn std::error::Error>> {
    let result = sylvascan::example_analysis_result();
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_serve(port: u16, db: &str) -> Result<(), Box<dyn std::error::Error>> {
    sylvascan::server::start_server(port, db).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

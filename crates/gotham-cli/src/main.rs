//! Gotham — terminal front end for the investigation workspace.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use gotham_client::ApiClient;
use gotham_core::{GothamConfig, Role};
use gotham_runtime::{FetchOutcome, Orchestrator};
use gotham_store::PaneKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

fn resolve_config_path() -> PathBuf {
    std::env::var("GOTHAM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("gotham.json"))
}

fn print_help() {
    println!("Gotham — investigative analytics workspace");
    println!();
    println!("Usage: gotham <command> [args]");
    println!();
    println!("Commands:");
    println!("  search <query>                      Free-text entity search");
    println!("  show <type> <id>                    Entity details and provenance");
    println!("  expand <type> <id> [depth]          Merge an entity's network");
    println!("  timeline <type> <id>                Event timeline");
    println!("  sightings <type> <id>               Geo sightings");
    println!("  contacts <type> <id>                Frequent contacts (Phone)");
    println!("  trace <type> <id>                   Money-flow trace (Account)");
    println!("  mentions <type> <id>                Document mentions");
    println!("  cases                               List investigation cases");
    println!("  case-new <name> [description]       Create and activate a case");
    println!("  case-load <case-id>                 Load a case's entities");
    println!("  audit [filter]                      Audit trail");
    println!("  document <id>                       Show a document");
    println!("  documents <query>                   Search documents");
    println!("  help                                Show this help message");
    println!();
    println!("Config: $GOTHAM_CONFIG (default gotham.json), GOTHAM_* overrides.");
}

fn pane_for_command(command: &str) -> Option<PaneKind> {
    match command {
        "timeline" => Some(PaneKind::Timeline),
        "sightings" => Some(PaneKind::Sightings),
        "contacts" => Some(PaneKind::Contacts),
        "trace" => Some(PaneKind::MoneyTrail),
        "mentions" => Some(PaneKind::Mentions),
        _ => None,
    }
}

fn entity_target<'a>(rest: &'a [String], command: &str) -> anyhow::Result<(&'a str, &'a str)> {
    match rest {
        [entity_type, id, ..] => Ok((entity_type.as_str(), id.as_str())),
        _ => bail!("Usage: gotham {} <type> <id>", command),
    }
}

fn print_nodes(orch: &Orchestrator, role: Role) {
    orch.workspace().read(|s| {
        print!("{}", render::render_graph_stats(&s.graph().stats()));
        for node in s.nodes() {
            println!(
                "  {} [{}] {}",
                render::entity_label(node, role),
                node.entity_type,
                node.id
            );
        }
    });
}

async fn run(orch: &Orchestrator, command: &str, rest: &[String], role: Role) -> anyhow::Result<()> {
    match command {
        "search" => {
            let query = rest.join(" ");
            if query.trim().is_empty() {
                bail!("Usage: gotham search <query>");
            }
            orch.search(&query).await?;
            let text = orch
                .workspace()
                .read(|s| render::render_search_results(s.search_results(), role));
            print!("{}", text);
        }
        "show" => {
            let (entity_type, id) = entity_target(rest, command)?;
            let entity = orch.open_entity(entity_type, id).await?;
            print!("{}", render::render_entity(&entity, role));
        }
        "expand" => {
            let (entity_type, id) = entity_target(rest, command)?;
            let depth = rest
                .get(2)
                .map(|d| d.parse::<u32>())
                .transpose()
                .with_context(|| format!("invalid depth: {}", rest[2]))?;
            orch.open_entity(entity_type, id).await?;
            orch.expand_selected(depth).await?;
            print_nodes(orch, role);
        }
        "cases" => {
            orch.refresh_cases().await?;
            let text = orch
                .workspace()
                .read(|s| render::render_cases(s.cases().cases(), s.cases().active_id()));
            print!("{}", text);
        }
        "case-new" => {
            let Some((name, description)) = rest.split_first() else {
                bail!("Usage: gotham case-new <name> [description]");
            };
            orch.refresh_cases().await?;
            let case = orch.create_case(name, &description.join(" ")).await?;
            info!("Active case is now {}", case.id);
            let text = orch
                .workspace()
                .read(|s| render::render_cases(s.cases().cases(), s.cases().active_id()));
            print!("{}", text);
        }
        "case-load" => {
            let Some(case_id) = rest.first() else {
                bail!("Usage: gotham case-load <case-id>");
            };
            orch.refresh_cases().await?;
            if !orch.activate_case(case_id) {
                bail!("Unknown case: {}", case_id);
            }
            orch.load_case_entities(case_id).await?;
            print_nodes(orch, role);
        }
        "audit" => {
            orch.refresh_audit_logs().await?;
            let logs = orch.filtered_audit_logs(&rest.join(" "));
            print!("{}", render::render_audit_logs(&logs));
        }
        "document" => {
            let Some(document_id) = rest.first() else {
                bail!("Usage: gotham document <id>");
            };
            let document = orch.get_document(document_id).await?;
            print!("{}", render::render_document(&document, role));
        }
        "documents" => {
            let query = rest.join(" ");
            if query.trim().is_empty() {
                bail!("Usage: gotham documents <query>");
            }
            for document in orch.search_documents(&query).await? {
                print!("{}", render::render_document(&document, role));
                println!();
            }
        }
        other => {
            let Some(kind) = pane_for_command(other) else {
                bail!("Unknown command: {}. Use 'gotham help' for usage.", other);
            };
            let (entity_type, id) = entity_target(rest, other)?;
            orch.open_entity(entity_type, id).await?;
            if orch.fetch_pane(kind).await? == FetchOutcome::Skipped {
                let required = kind.required_entity_type().unwrap_or("matching");
                bail!("{} needs a {} entity, got {}", other, required, entity_type);
            }
            let text = orch
                .workspace()
                .read(|s| render::render_pane(s.panes(), kind, role));
            print!("{}", text);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_help();
        return Ok(());
    };
    if matches!(command.as_str(), "--help" | "-h" | "help") {
        print_help();
        return Ok(());
    }

    let config_path = resolve_config_path();
    let config = GothamConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let api = Arc::new(ApiClient::from_config(&config)?);
    let orch = Orchestrator::new(api, &config);

    let result = run(&orch, command, &args[2..], config.role).await;

    // Notifications are shown whether or not the command succeeded.
    let toasts = orch.workspace().take_toasts();
    print!("{}", render::render_toasts(&toasts));

    result
}

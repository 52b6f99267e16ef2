use std::fs;
use std::path::PathBuf;

use clap::Parser;
use snudoc::{Component, Config, List, ListKind, StyledText};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snudoc")]
#[command(about = "Inspect the document model of converter HTML")]
struct Cli {
    /// Input HTML file
    input: PathBuf,

    /// Configuration file (defaults to the bundled configuration)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the links in first-seen order instead of the outline
    #[arg(long)]
    links: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::compiled_default(),
    };

    // Read input file
    let html = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let document = match snudoc::parse_with_options(&html, &config.parser) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.links {
        for link in document.links() {
            println!("{}", link);
        }
        return;
    }

    for component in &document.components {
        print_component(component);
    }
}

fn print_component(component: &Component) {
    match component {
        Component::Text(text) => {
            let label = match text.header_level() {
                Some(level) => format!("h{}", level.number()),
                None => "text".to_string(),
            };
            println!("{} {}", label, describe(text));
        }
        Component::Code(code) => {
            println!("code ({} lines)", code.lines().count());
            for line in code.lines() {
                println!("  | {}", line);
            }
        }
        Component::Image { url, width, height } => {
            println!("image {} {}x{}", url, width, height);
        }
        Component::Table(table) => {
            println!("table {} columns, {} rows", table.headers.len(), table.rows.len());
            let headers: Vec<&str> = table.headers.iter().map(|h| h.text.as_str()).collect();
            println!("  [{}]", headers.join(" | "));
            for row in &table.rows {
                let cells: Vec<&str> = row.iter().map(|c| c.text.as_str()).collect();
                println!("  {}", cells.join(" | "));
            }
        }
        Component::List(list) => {
            println!("list ({} items)", list.count_items());
            print_list(list, 1);
        }
        Component::Blockquote { fragments, depth } => {
            println!("quote depth {}", depth);
            for fragment in fragments {
                println!("  > {}", describe(fragment));
            }
        }
    }
}

fn print_list(list: &List, indent: usize) {
    let indent_str = "  ".repeat(indent);
    for (i, node) in list.children.iter().enumerate() {
        let marker = match list.kind {
            ListKind::Ordered => format!("{}.", i + 1),
            ListKind::Unordered => "-".to_string(),
        };
        println!("{}{} {}", indent_str, marker, describe(&node.text));
        if let Some(ref nested) = node.list {
            print_list(nested, indent + 1);
        }
    }
}

fn describe(text: &StyledText) -> String {
    let mut out = format!("{:?}", text.text);
    if !text.styles.is_empty() {
        out.push_str(&format!(" [{} styles]", text.styles.len()));
    }
    if !text.spoilers.is_empty() {
        out.push_str(&format!(" [{} spoilers]", text.spoilers.len()));
    }
    for link in &text.links {
        out.push_str(&format!(
            " [{:?} -> {}]",
            text.slice(link.range.clone()),
            link.href
        ));
    }
    out
}

use clap::{Args, Parser, Subcommand};
use mtg_fetch::config::{Config, DirKey, FaceNaming, ImageSize, SeparatorPolicy};
use mtg_fetch::download::{self, Confirm};
use mtg_fetch::materialize::{Materializer, Tally};
use mtg_fetch::tcg::mtg::ScryfallClient;
use mtg_fetch::tcg::CardPage;
use mtg_fetch::utils::files::{count_set_images, ensure_directory};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Fetch Magic: The Gathering card images from Scryfall
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    output: OutputArgs,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Directory where card images are written
    #[arg(short, long, default_value = "art", global = true)]
    path: PathBuf,

    /// Image variant to download
    #[arg(long, value_enum, default_value_t = ImageSize::Large, global = true)]
    size: ImageSize,

    /// How the " // " separator in card names is written
    #[arg(long, value_enum, default_value_t = SeparatorPolicy::Join, global = true)]
    separator: SeparatorPolicy,

    /// Name set directories by set name or set code
    #[arg(long, value_enum, default_value_t = DirKey::SetName, global = true)]
    dir_key: DirKey,

    /// File naming for multi-face cards
    #[arg(long, value_enum, default_value_t = FaceNaming::PerFace, global = true)]
    face_naming: FaceNaming,

    /// Create empty files instead of downloading images
    #[arg(long, default_value_t = false, global = true)]
    touch_only: bool,

    /// Hide the progress bar
    #[arg(long, default_value_t = false, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download every card of a set
    Set {
        /// Set code, e.g. "inv"
        code: String,
    },
    /// Download the cards named in a card-list file
    List {
        /// Card-list file, one `<name> [<set>] <number>` entry per line
        file: PathBuf,
    },
    /// Download the results of a Scryfall query
    Query {
        /// Query such as "name:Mountain set:bng"
        query: String,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// Check whether a set exists
    CheckSet {
        /// Set code, e.g. "inv"
        code: String,
    },
}

impl OutputArgs {
    fn to_config(&self) -> Config {
        Config {
            output_root: self.path.clone(),
            image_size: self.size,
            separator: self.separator,
            dir_key: self.dir_key,
            face_naming: self.face_naming,
            touch_only: self.touch_only,
            progress: !self.no_progress,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "mtg_fetch=debug"
    } else {
        "mtg_fetch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Show up to ten cards of the first page and ask for confirmation on stdin.
fn confirm_on_stdin(page: &CardPage) -> bool {
    if page.total_cards == 1 {
        println!("1 card found");
    } else {
        println!("{} cards found", page.total_cards);
    }
    for card in page.cards.iter().take(10) {
        println!(" {}:{}", card.set.name, card.name);
    }
    if page.cards.len() > 10 {
        println!(" ...");
    }

    print!("Is this correct? ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut reply = String::new();
    if io::stdin().lock().read_line(&mut reply).is_err() {
        return false;
    }
    !matches!(reply.trim(), "n" | "N" | "no" | "NO")
}

fn print_summary(config: &Config, tally: Tally, started: Instant) {
    println!();
    println!("Total cards saved:     {}", tally.saved);
    println!("Total cards not saved: {}", tally.not_saved);
    println!("Elapsed time: {:.2?}", started.elapsed());

    match count_set_images(&config.output_root) {
        Ok(counts) => {
            let images: usize = counts.iter().map(|(_, n)| n).sum();
            println!(
                "{} images in {} set directories under {}",
                images,
                counts.len(),
                config.output_root.display()
            );
        }
        Err(e) => eprintln!("Error counting set directories: {}", e),
    }
}

async fn run(cli: Cli) -> mtg_fetch::Result<()> {
    let config = cli.output.to_config();
    let client = ScryfallClient::new(config.image_size)?;

    if let Commands::CheckSet { code } = &cli.command {
        match download::check_set(&client, code).await {
            Some(set) => println!(
                "{} ({}): {} cards, released {}",
                set.name,
                set.code,
                set.card_count,
                set.released_at.as_deref().unwrap_or("unknown")
            ),
            None => println!("Set not found: {}", code.trim()),
        }
        return Ok(());
    }

    ensure_directory(&config.output_root)?;
    println!("Writing files in {}\n", config.output_root.display());

    let mut materializer = Materializer::new(&config, &client);
    let started = Instant::now();

    let tally = match &cli.command {
        Commands::Set { code } => {
            download::download_set(&client, &mut materializer, code, config.progress).await?
        }
        Commands::List { file } => {
            download::download_list(&client, &mut materializer, file, config.progress).await?
        }
        Commands::Query { query, yes } => {
            let mut prompt = confirm_on_stdin;
            let confirm: Option<Confirm<'_>> = if *yes { None } else { Some(&mut prompt) };
            let tally =
                download::run_query(&client, &mut materializer, query, config.progress, confirm)
                    .await?;
            if tally.is_empty() {
                println!("No cards found");
            }
            tally
        }
        Commands::CheckSet { .. } => Tally::default(),
    };

    print_summary(&config, tally, started);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

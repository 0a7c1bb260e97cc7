use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pysecure_app::shell::run_generation;
use pysecure_app::{
    generator_for, load_settings, view, Action, Effect, LoginForm,
    SettingsUpdate, Shell, SystemClipboard, Tab, Ticket,
};
use pysecure_core::{classify, ApplicationStatus, ProjectBundle, PromptVariant};
use pysecure_gen::{GenerateError, Generator};
use pysecure_layout::runner::FRAME_INTERVAL;
use pysecure_layout::{settle, svg, DragCommand, LayoutRunner, Viewport};

#[derive(Parser)]
#[command(name = "pysecure")]
#[command(about = "Generate and explore a modular Python login project")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a login identifier (email, cpf, name)
    Classify {
        input: String,
    },
    /// Run one generation and print the project
    Generate {
        #[arg(long)]
        variant: Option<PromptVariant>,

        /// Print the raw bundle as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a saved bundle ("-" reads stdin)
    View {
        bundle: String,

        #[arg(long, default_value = "code")]
        tab: Tab,
    },
    /// Lay out the mental map of a saved bundle
    Layout {
        bundle: String,

        #[arg(long, default_value_t = 800.0)]
        width: f64,

        #[arg(long, default_value_t = 400.0)]
        height: f64,

        /// Print SVG instead of node positions
        #[arg(long)]
        svg: bool,
    },
    /// Interactive session over the application state
    Shell,
    /// Show or update AI settings
    Settings {
        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        variant: Option<PromptVariant>,
    },
}

/// Logs go to stderr so stdout stays clean for JSON and SVG.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pysecure=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn read_bundle(source: &str) -> anyhow::Result<ProjectBundle> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        let path = PathBuf::from(source);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };
    Ok(ProjectBundle::from_json(&raw)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Classify { input } => {
            let kind = classify(&input);
            println!("{}\t{}", kind.as_str(), kind.label());
        }
        Commands::Generate { variant, json } => {
            let mut settings = load_settings();
            if let Some(v) = variant {
                settings.variant = v;
            }
            let generator = generator_for(&settings)?;

            let mut shell = Shell::new();
            run_generation(&mut shell, &generator).await?;
            match shell.bundle() {
                Some(bundle) if json => println!("{}", bundle.to_json_pretty()?),
                Some(bundle) => print!("{}", view::render_code(&view::code_view(bundle, None))),
                None => bail!(
                    "generation failed: {}",
                    shell.last_error().unwrap_or("unknown error")
                ),
            }
        }
        Commands::View { bundle, tab } => {
            let bundle = read_bundle(&bundle).await?;
            print!("{}", view::render_tab(&bundle, tab, None, Viewport::default()));
        }
        Commands::Layout {
            bundle,
            width,
            height,
            svg: as_svg,
        } => {
            let bundle = read_bundle(&bundle).await?;
            let viewport = Viewport::new(width, height);
            let layout = settle(&bundle.mental_map, viewport);
            if as_svg {
                print!("{}", svg::render(&layout, &viewport));
            } else {
                println!("{}", serde_json::to_string_pretty(&layout)?);
            }
        }
        Commands::Shell => {
            let settings = load_settings();
            let generator = generator_for(&settings)?;
            run_shell(generator).await?;
        }
        Commands::Settings {
            provider,
            model,
            api_key,
            variant,
        } => {
            let mut settings = pysecure_core::read_settings();
            let update = SettingsUpdate {
                provider,
                model,
                api_key,
                variant,
            };
            if !update.is_empty() {
                update.apply(&mut settings);
                pysecure_core::write_settings(&settings)?;
                tracing::info!("settings saved");
            }
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
        }
    }

    Ok(())
}

// --- Interactive shell ---

const HELP: &str = "commands: generate | tab code|docs|map | info | close | copy N | \
drag ID X Y | drop ID | login <text> | status | quit";

type Completion = (Ticket, Result<ProjectBundle, GenerateError>);

async fn run_shell(generator: Generator) -> anyhow::Result<()> {
    let mut shell = Shell::new();
    let mut form = LoginForm::new();
    let mut clipboard: Option<SystemClipboard> = None;
    let mut map: Option<LayoutRunner> = None;
    let viewport = Viewport::default();

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", view::render_screen(&shell, None, viewport));
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (cmd, arg) = line
                    .split_once(' ')
                    .map(|(cmd, arg)| (cmd, arg.trim()))
                    .unwrap_or((line, ""));
                match cmd {
                    "quit" | "exit" => break,
                    "help" => println!("{HELP}"),
                    "status" => println!("{}", shell.status().as_str()),
                    "generate" => match shell.dispatch(Action::Generate) {
                        Ok(Effect::StartGeneration(ticket)) => {
                            let generator = generator.clone();
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let outcome = generator.generate().await;
                                let _ = done_tx.send((ticket, outcome));
                            });
                            println!("{}", view::render_screen(&shell, None, viewport));
                        }
                        Ok(Effect::None) => {}
                        Err(e) => println!("{e}"),
                    },
                    "tab" => match arg.parse::<Tab>() {
                        Ok(tab) => {
                            let _ = shell.dispatch(Action::SelectTab(tab));
                            print_screen(&shell, viewport);
                        }
                        Err(e) => println!("{e}"),
                    },
                    "info" => match shell.dispatch(Action::OpenInfo) {
                        Ok(_) => print_screen(&shell, viewport),
                        Err(e) => println!("{e}"),
                    },
                    "close" => {
                        let _ = shell.dispatch(Action::CloseInfo);
                        print_screen(&shell, viewport);
                    }
                    "copy" => {
                        let Ok(index) = arg.parse::<usize>() else {
                            println!("usage: copy N");
                            continue;
                        };
                        if clipboard.is_none() {
                            match SystemClipboard::detect() {
                                Ok(found) => clipboard = Some(found),
                                Err(e) => {
                                    println!("{e}");
                                    continue;
                                }
                            }
                        }
                        let Some(clip) = clipboard.as_mut() else { continue };
                        match shell.copy_file(index, clip, Instant::now()) {
                            Ok(()) => print_screen(&shell, viewport),
                            Err(e) => println!("{e}"),
                        }
                    }
                    "drag" => {
                        let parts: Vec<&str> = arg.split_whitespace().collect();
                        let (Some(runner), [id, x, y]) = (map.as_ref(), parts.as_slice()) else {
                            println!("usage: drag ID X Y (map tab must be open)");
                            continue;
                        };
                        let (Ok(x), Ok(y)) = (x.parse::<f64>(), y.parse::<f64>()) else {
                            println!("usage: drag ID X Y");
                            continue;
                        };
                        let mut frames = runner.frames();
                        frames.borrow_and_update();
                        runner.drag(DragCommand::Start { id: id.to_string() });
                        runner.drag(DragCommand::Move { id: id.to_string(), x, y });
                        let _ = tokio::time::timeout(FRAME_INTERVAL * 4, frames.changed()).await;
                        print_node(runner, id);
                    }
                    "drop" => match map.as_ref() {
                        Some(runner) => {
                            let mut frames = runner.frames();
                            frames.borrow_and_update();
                            runner.drag(DragCommand::End { id: arg.to_string() });
                            let _ = tokio::time::timeout(FRAME_INTERVAL * 4, frames.changed()).await;
                            print_node(runner, arg);
                        }
                        None => println!("map tab is not open"),
                    },
                    "login" => {
                        form.set_identifier(arg);
                        print!("{}", form.render());
                    }
                    other => println!("unknown command: {other}\n{HELP}"),
                }
                sync_map(&shell, &mut map, viewport);
            }
            Some((ticket, outcome)) = done_rx.recv() => {
                if let Err(e) = shell.complete(ticket, outcome) {
                    tracing::warn!(error = %e, "dropped generation result");
                }
                println!("{}", view::render_screen(&shell, None, viewport));
                sync_map(&shell, &mut map, viewport);
            }
        }
    }

    if shell.status() == ApplicationStatus::Generating {
        tracing::info!("exiting with a generation still in flight");
    }
    Ok(())
}

/// Keep the animated map alive exactly while the map tab is on screen.
fn sync_map(shell: &Shell, map: &mut Option<LayoutRunner>, viewport: Viewport) {
    let visible = shell.info_open() && shell.tab() == Tab::Map;
    match (visible, shell.bundle(), map.is_some()) {
        (true, Some(bundle), false) => {
            *map = Some(LayoutRunner::spawn(&bundle.mental_map, viewport));
            tracing::debug!("map loop started");
        }
        (true, Some(_), true) => {}
        (_, _, true) => {
            if let Some(mut runner) = map.take() {
                runner.stop();
                tracing::debug!("map loop stopped");
            }
        }
        _ => {}
    }
}

fn print_node(runner: &LayoutRunner, id: &str) {
    match runner.latest().node(id) {
        Some(n) => println!("{} ({:.1}, {:.1}){}", n.id, n.x, n.y, if n.pinned { " pinned" } else { "" }),
        None => println!("no node '{id}' in the map"),
    }
}

fn print_screen(shell: &Shell, viewport: Viewport) {
    let copied = shell.copied_index(Instant::now());
    println!("{}", view::render_screen(shell, copied, viewport));
}

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use scrollyte::{
    Engine, Host as _, MemoryHost, SceneDef, Section, Viewport,
    site::{
        app::route_scene,
        chat::{ChatRole, ChatSession, FileTranscriptStore},
        config::SiteConfig,
        datastore::RestDatastore,
        forms::{ContactForm, FormState, Inquiry, NewsletterForm},
        routes::Route,
    },
};

#[derive(Parser, Debug)]
#[command(name = "scrollyte", version)]
struct Cli {
    /// Log engine diagnostics to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a scene document and mount every section.
    Validate(SceneArgs),
    /// Print element styles after scrolling to an offset.
    Sample(SampleArgs),
    /// Render a debug frame as a PNG.
    Frame(FrameArgs),
    /// Write the stacked scene of one page as JSON.
    Scaffold(ScaffoldArgs),
    /// Subscribe an email to the newsletter (reads `SCROLLYTE_*` from the environment or `.env`).
    Subscribe(SubscribeArgs),
    /// Store a contact message and notify the team by email.
    Contact(ContactArgs),
    /// Send one message to the support chat, keeping the transcript in a file.
    Chat(ChatArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Scroll offset in pixels.
    #[arg(long)]
    scroll: f64,

    /// Seconds of simulated time after the scroll.
    #[arg(long, default_value_t = 1.0)]
    time: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    sample: SampleArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Page {
    Home,
    About,
    Vision,
    Contact,
}

impl From<Page> for Route {
    fn from(p: Page) -> Self {
        match p {
            Page::Home => Route::Home,
            Page::About => Route::About,
            Page::Vision => Route::Vision,
            Page::Contact => Route::Contact,
        }
    }
}

#[derive(Parser, Debug)]
struct ScaffoldArgs {
    /// Page to lay out.
    #[arg(long, value_enum, default_value_t = Page::Home)]
    page: Page,

    /// Viewport as `WIDTHxHEIGHT`.
    #[arg(long, default_value = "1280x720")]
    viewport: String,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SubscribeArgs {
    /// Email to subscribe.
    #[arg(long)]
    email: String,

    /// Recorded as the signup source.
    #[arg(long, default_value = "cli")]
    source: String,
}

#[derive(Parser, Debug)]
struct ContactArgs {
    /// Sender name.
    #[arg(long)]
    name: String,

    /// Sender email.
    #[arg(long)]
    email: String,

    #[arg(long, default_value = "")]
    subject: String,

    /// Message body.
    #[arg(long)]
    message: String,

    /// File the message as a sales inquiry.
    #[arg(long)]
    sales: bool,
}

#[derive(Parser, Debug)]
struct ChatArgs {
    /// Message to send; omit with `--clear` to only forget the conversation.
    #[arg(long)]
    message: Option<String>,

    /// Transcript cache.
    #[arg(long, default_value = ".scrollyte-chat.json")]
    transcript: PathBuf,

    /// Forget the conversation before sending.
    #[arg(long)]
    clear: bool,
}

const FPS: f64 = 60.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Scaffold(args) => cmd_scaffold(args),
        Command::Subscribe(args) => cmd_subscribe(args).await,
        Command::Contact(args) => cmd_contact(args).await,
        Command::Chat(args) => cmd_chat(args).await,
    }
}

fn read_scene(path: &Path) -> anyhow::Result<SceneDef> {
    let scene = SceneDef::from_path(path).with_context(|| format!("load scene '{}'", path.display()))?;
    scene.validate().with_context(|| format!("validate scene '{}'", path.display()))?;
    Ok(scene)
}

/// Mount every section, scroll to `scroll` and run `time` seconds of frames.
fn simulate(scene: &SceneDef, scroll: f64, time: f64) -> Engine<MemoryHost> {
    let mut engine = Engine::new(scene.host());
    for def in &scene.sections {
        let mounted = Section::mount(def, &mut engine);
        if let Some(reason) = mounted.degraded() {
            eprintln!("section '{}' is static: {reason}", def.id);
        }
    }
    engine.tick(0.0);
    engine.host_mut().set_scroll_y(scroll.clamp(0.0, scene.max_scroll()));
    let frames = (time.max(0.0) * FPS).ceil() as u64;
    for i in 1..=frames.max(1) {
        engine.tick(i as f64 / FPS);
    }
    engine
}

fn cmd_validate(args: SceneArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let mut engine = Engine::new(scene.host());
    let mut degraded = 0;
    for def in &scene.sections {
        let mut mounted = Section::mount(def, &mut engine);
        match mounted.degraded() {
            Some(reason) => {
                degraded += 1;
                eprintln!("{}: static ({reason})", def.id);
            }
            None => eprintln!(
                "{}: ok ({} timelines{})",
                def.id,
                mounted.timelines().len(),
                if mounted.stages().is_some() { ", staged" } else { "" }
            ),
        }
        mounted.teardown(&mut engine);
    }
    if degraded > 0 {
        anyhow::bail!("{degraded} of {} sections failed to mount", scene.sections.len());
    }
    eprintln!("ok: {} sections", scene.sections.len());
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.scene.in_path)?;
    let engine = simulate(&scene, args.scroll, args.time);
    let host = engine.host();
    let styles: BTreeMap<_, _> = host
        .elements()
        .filter_map(|(id, _)| host.styles_of(id).map(|s| (id, s)))
        .collect();
    let out = serde_json::json!({
        "scroll": host.scroll_y(),
        "pinned": host.pinned_count(),
        "styles": styles,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.sample.scene.in_path)?;
    let engine = simulate(&scene, args.sample.scroll, args.sample.time);
    let frame = scrollyte::render_debug_frame(engine.host())?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_scaffold(args: ScaffoldArgs) -> anyhow::Result<()> {
    let viewport = Viewport::parse(&args.viewport)?;
    let scene = route_scene(args.page.into(), viewport);
    let json = serde_json::to_string_pretty(&scene)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("write scene '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn site_config() -> SiteConfig {
    let _ = dotenvy::dotenv();
    SiteConfig::from_env()
}

async fn cmd_subscribe(args: SubscribeArgs) -> anyhow::Result<()> {
    let config = site_config();
    let (url, key) = config.datastore()?;
    let store = RestDatastore::new(url, key);

    let mut form = NewsletterForm::new(args.email);
    match form.submit(&store, &args.source, chrono::Utc::now()).await {
        FormState::Succeeded { .. } => eprintln!("subscribed"),
        FormState::AlreadySubscribed => eprintln!("already subscribed"),
        FormState::Failed(msg) => anyhow::bail!("subscription failed: {msg}"),
        other => anyhow::bail!("unexpected form state {other:?}"),
    }
    Ok(())
}

async fn cmd_contact(args: ContactArgs) -> anyhow::Result<()> {
    let config = site_config();
    let (url, key) = config.datastore()?;
    let store = RestDatastore::new(url, key);
    let mailer = config.mailer()?;

    let inquiry = if args.sales { Inquiry::Sales } else { Inquiry::General };
    let mut form = ContactForm::new(args.name, args.email, args.subject, args.message, inquiry);
    match form.submit(&store, &mailer, chrono::Utc::now()).await {
        FormState::Succeeded { .. } => eprintln!("message sent"),
        FormState::Failed(msg) => anyhow::bail!("contact failed: {msg}"),
        other => anyhow::bail!("unexpected form state {other:?}"),
    }
    Ok(())
}

async fn cmd_chat(args: ChatArgs) -> anyhow::Result<()> {
    let config = site_config();
    let client = config.completion_client()?;
    let mut chat = ChatSession::open(FileTranscriptStore::new(&args.transcript), client)
        .with_context(|| format!("open transcript '{}'", args.transcript.display()))?;

    if args.clear {
        chat.clear().await?;
        eprintln!("conversation cleared");
    }
    let Some(message) = args.message else {
        return Ok(());
    };
    let reply = chat.send(&message, chrono::Utc::now()).await?;
    match reply.role {
        ChatRole::Error => anyhow::bail!("{}", reply.text),
        _ => println!("{}", reply.text),
    }
    Ok(())
}

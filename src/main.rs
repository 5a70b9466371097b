use anyhow::Result;
use clap::{Parser, Subcommand};
use slope_coach::config::CoachConfig;
use slope_coach::payload::{ActivityCategory, AnalysisContext, AnalysisFocus};

/// Ski and snowboard technique feedback from a video URL.
#[derive(Parser, Debug)]
#[command(name = "coach")]
#[command(about = "🎿 Analyze ski/snowboard technique from a video with a vision model")]
#[command(long_about = "Downloads a video, samples frames with ffmpeg, compresses them under the request budget
and asks a vision model for structured coaching feedback. Requires OPENAI_API_KEY.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one video and print the raw model output
    Analyze {
        /// Video URL (http or https)
        url: String,

        #[arg(short, long, value_enum, default_value_t = ActivityCategory::Ski,
              help = "Discipline: ski (two skis) or snowboard")]
        category: ActivityCategory,

        #[arg(short, long, default_value = "PSIA",
              help = "Teaching standard vocabulary, e.g. PSIA, CSIA, CASI")]
        standard: String,

        #[arg(short, long, value_enum, default_value_t = AnalysisFocus::Fluidity,
              help = "What to focus on: fluidity or edge-control")]
        focus: AnalysisFocus,

        #[arg(long, help = "Workspace id (defaults to a random id)")]
        id: Option<String>,
    },
    /// Run the HTTP service
    Serve {
        #[arg(short, long, help = "Bind address (overrides COACH_BIND)")]
        bind: Option<String>,

        #[arg(short, long, help = "Port (overrides COACH_PORT)")]
        port: Option<u16>,
    },
}

fn main() -> Result<()> {
    slope_coach::logging::init();
    let cli = Cli::parse();
    let mut config = CoachConfig::from_env();

    match cli.command {
        Command::Analyze { url, category, standard, focus, id } => {
            let ctx = AnalysisContext { category, standard, focus };
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let result = slope_coach::analyze_video(&config, &url, &id, &ctx)?;
            println!("{}", result.content);
            Ok(())
        }
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            // Blocking HTTP clients are only ever built inside spawn_blocking workers.
            let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            runtime.block_on(slope_coach::server::serve(config))
        }
    }
}

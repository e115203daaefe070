use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scene_driver::{
    BuildMode, BuildOptions, BuildOrchestrator, Construction, ControlGroup, ControlPanel,
    CountingStore, Fence, HttpStore, Nudge, Pile, SceneConfig, SceneStore, reset_camera,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "scene-driver")]
#[command(about = "Build and steer objects in a remote scene store")]
struct Args {
    /// Base URL of the scene server
    #[arg(long, env = "SCENE_DRIVER_URL", default_value = "http://localhost:8001")]
    url: String,

    /// Store layout and tuning (TOML)
    #[arg(long, env = "SCENE_DRIVER_CONFIG")]
    config: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Batch,
    Stepwise,
}

impl From<Mode> for BuildMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Batch => BuildMode::Batch,
            Mode::Stepwise => BuildMode::Stepwise,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Group {
    Camera,
    Cursor,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a grid of cubes
    Pile {
        #[arg(long, default_value_t = 2)]
        width: usize,
        #[arg(long, default_value_t = 1)]
        depth: usize,
        #[arg(long, default_value_t = 3)]
        height: usize,
        #[arg(long, default_value_t = 1.5)]
        separation: f32,
        #[arg(long, value_enum)]
        mode: Mode,
        /// Move the cursor onto each object as it is built
        #[arg(long)]
        track_build: bool,
    },
    /// Build posts with spinning caps along a turning line
    Fence {
        #[arg(long, default_value_t = 2)]
        posts: usize,
        #[arg(long, default_value_t = 4.0)]
        separation: f32,
        #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
        turn_degrees: f32,
        #[arg(long, default_value_t = 240.0, allow_negative_numbers = true)]
        spin_degrees: f32,
        #[arg(long, default_value_t = 3.0)]
        height: f32,
        #[arg(long, value_enum)]
        mode: Mode,
        #[arg(long)]
        track_build: bool,
    },
    /// Turn physics on for every object
    Drop,
    /// Cancel every per-object animation
    StopSpinning,
    /// Remove every object and reset floor and cursor
    Clear,
    /// Move the cursor by a number of places, or to an absolute position
    Cursor {
        #[arg(long, allow_negative_numbers = true, conflicts_with = "to")]
        by: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        to: Option<i64>,
    },
    /// Send the camera home
    ResetCamera,
    /// Start a control moving at a nudge speed
    Nudge {
        #[arg(value_enum)]
        group: Group,
        control: String,
        /// One of ++ + - --
        #[arg(allow_hyphen_values = true)]
        nudge: Nudge,
    },
    /// Stop a control
    Stop {
        #[arg(value_enum)]
        group: Group,
        control: String,
    },
    /// Read a control's value
    Get {
        #[arg(value_enum)]
        group: Group,
        control: String,
    },
    /// Animate a control to a value
    Set {
        #[arg(value_enum)]
        group: Group,
        control: String,
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },
}

fn panel(group: Group, store: &Arc<dyn SceneStore>, config: &SceneConfig) -> ControlPanel {
    let group = match group {
        Group::Camera => ControlGroup::camera(Arc::clone(store), config),
        Group::Cursor => ControlGroup::cursor(Arc::clone(store), config),
    };
    ControlPanel::new(group)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scene_driver=info".parse()?),
        )
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SceneConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => SceneConfig::default(),
    };
    let config = Arc::new(config);

    let http = HttpStore::new(&args.url, Duration::from_millis(args.timeout_ms))?;
    let counting = Arc::new(CountingStore::new(http));
    let store: Arc<dyn SceneStore> = counting.clone();
    let orchestrator = BuildOrchestrator::new(Arc::clone(&store), Arc::clone(&config));

    match args.command {
        Command::Pile {
            width,
            depth,
            height,
            separation,
            mode,
            track_build,
        } => {
            let construction = Construction::Pile(Pile {
                width,
                depth,
                height,
                separation,
            });
            build(&orchestrator, &construction, mode, track_build).await?;
        }
        Command::Fence {
            posts,
            separation,
            turn_degrees,
            spin_degrees,
            height,
            mode,
            track_build,
        } => {
            let construction = Construction::Fence(Fence {
                posts,
                separation,
                turn_degrees,
                spin_degrees,
                height,
            });
            build(&orchestrator, &construction, mode, track_build).await?;
        }
        Command::Drop => {
            let count = orchestrator.drop_objects().await?;
            info!(count, "dropped");
        }
        Command::StopSpinning => orchestrator.stop_spinning().await?,
        Command::Clear => orchestrator.clear().await?,
        Command::Cursor { by, to } => {
            let cursor = orchestrator.cursor();
            let target = match (by, to) {
                (_, Some(value)) => cursor.jump(value).await?,
                (by, None) => cursor.step(by.unwrap_or(1)).await?,
            };
            println!("{target}");
        }
        Command::ResetCamera => {
            let camera = ControlGroup::camera(Arc::clone(&store), &config);
            reset_camera(store.as_ref(), &camera, orchestrator.cursor(), &config).await?;
        }
        Command::Nudge {
            group,
            control,
            nudge,
        } => {
            let mut panel = panel(group, &store, &config);
            panel.click_nudge(&control, nudge).await?;
        }
        Command::Stop { group, control } => {
            panel(group, &store, &config).group().control(&control)?.stop().await?;
        }
        Command::Get { group, control } => {
            let value = panel(group, &store, &config).group().control(&control)?.get().await?;
            println!("{value:.1}");
        }
        Command::Set {
            group,
            control,
            value,
        } => {
            let mut panel = panel(group, &store, &config);
            let current = panel.activate_input(&control).await?;
            info!(%control, current, target = value, "setting");
            panel.input_value(&control, value).await?;
        }
    }

    info!(requests = %counting.counts(), "done");
    Ok(())
}

async fn build(
    orchestrator: &BuildOrchestrator,
    construction: &Construction,
    mode: Mode,
    track_build: bool,
) -> Result<()> {
    construction.validate()?;
    let plan = construction.plan(orchestrator.config());
    let result = orchestrator
        .build(&plan, mode.into(), BuildOptions { track_build })
        .await?;
    println!(
        "built {} of {} (previously {}, removed {})",
        result.built, result.planned, result.previous_count, result.removed
    );
    Ok(())
}

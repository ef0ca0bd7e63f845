//! Region inspector
//!
//! Loads one world from the configured store and reports what applies at a
//! block:
//!
//! ```text
//! ward-inspect <world> <x> <y> <z> [flag] [player-uuid]
//! ```
//!
//! Without a flag every registered flag that resolves to a value is shown.
//! The config file is read from `WARD_CONFIG` if set; `WARD_DATA_DIR`,
//! `WARD_BACKEND` and `WARD_AUTOSAVE` override it.

use std::path::PathBuf;
use std::sync::Arc;

use eyre::{WrapErr, bail};
use tracing::info;
use uuid::Uuid;
use ward_geom::BlockPos;
use ward_manager::{ManagerConfig, Worlds};
use ward_region::{FlagRegistry, Player, Subject};

const USAGE: &str = "usage: ward-inspect <world> <x> <y> <z> [flag] [player-uuid]";

struct Args {
    world: String,
    pos: BlockPos,
    flag: Option<String>,
    player: Option<Uuid>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> eyre::Result<Self> {
        let Some(world) = args.next() else {
            bail!(USAGE);
        };
        let mut coord = |axis: &str| -> eyre::Result<i32> {
            let Some(raw) = args.next() else {
                bail!(USAGE);
            };
            raw.parse().wrap_err_with(|| format!("bad {axis} coordinate '{raw}'"))
        };
        let pos = BlockPos::new(coord("x")?, coord("y")?, coord("z")?);

        let flag = args.next();
        let player = args
            .next()
            .map(|raw| raw.parse::<Uuid>().wrap_err_with(|| format!("bad player uuid '{raw}'")))
            .transpose()?;

        Ok(Self { world, pos, flag, player })
    }
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward_inspect=info".parse()?)
                .add_directive("ward_manager=info".parse()?),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let config_path = std::env::var("WARD_CONFIG").ok().map(PathBuf::from);
    let config = ManagerConfig::load(config_path.as_deref())?;
    info!("Data directory: {} ({:?} backend)", config.data_dir.display(), config.backend);

    let worlds = Worlds::open(config, Arc::new(FlagRegistry::standard()))?;
    let world = worlds
        .load_world(&args.world)
        .wrap_err_with(|| format!("failed to load world '{}'", args.world))?;

    let player = args.player.map(Player::new);
    let subject = player.as_ref().map(|p| p as &dyn Subject);

    let set = world.regions_containing(args.pos);
    if set.is_empty() {
        info!("No regions at {}", args.pos);
    }
    for region in set.iter() {
        let role = if set.direct().iter().any(|r| r.id() == region.id()) {
            "direct"
        } else if region.is_global() {
            "global"
        } else {
            "inherited"
        };
        info!(
            "{} [{}] priority {} {:?}{}",
            region.id(),
            role,
            region.priority(),
            region.shape().kind(),
            region.parent().map(|p| format!(" parent {p}")).unwrap_or_default()
        );
    }

    let flags: Vec<String> = match &args.flag {
        Some(flag) => vec![flag.clone()],
        None => world.registry().definitions().into_iter().map(|def| def.name.clone()).collect(),
    };

    for flag in &flags {
        let resolution = world.query_flag(args.pos, flag, subject)?;
        let Some(value) = &resolution.value else {
            if args.flag.is_some() {
                info!("{flag}: unset");
            }
            continue;
        };
        let source = resolution.winning_region.as_ref().map_or("-", |id| id.as_str());
        let bypass = if resolution.owner_override { " (owner bypass)" } else { "" };
        info!("{flag} = {value:?} from {source}{bypass}");
    }

    Ok(())
}

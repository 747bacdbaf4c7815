use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use flipbook::frame::plane::max_mipmap_level;
use flipbook::resource::dir::DirSource;
use flipbook::resource::ordered::OrderedSources;
use flipbook::texture::component::MemoryUploader;

#[derive(Parser, Debug)]
#[command(name = "flipbook", version)]
struct Cli {
    /// Load options JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the animated textures found in the given packs.
    Inspect(InspectArgs),
    /// Tick one texture and write its current frame as a PNG.
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Pack directories, highest priority first.
    #[arg(long = "pack", required = true)]
    packs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Pack directories, highest priority first.
    #[arg(long = "pack", required = true)]
    packs: Vec<PathBuf>,

    /// Texture location, e.g. `minecraft:textures/block/lava.png`.
    #[arg(long)]
    texture: String,

    /// Number of ticks before the frame is captured.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let opts = read_options(cli.config.as_deref())?;
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args, &opts),
        Command::Animate(args) => cmd_animate(args, &opts),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_options(path: Option<&Path>) -> anyhow::Result<flipbook::LoadOptions> {
    let Some(path) = path else {
        return Ok(flipbook::LoadOptions::default());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
    Ok(flipbook::LoadOptions::from_json(&bytes)?)
}

fn pack_stack(packs: &[PathBuf]) -> OrderedSources {
    let mut stack = OrderedSources::default();
    for pack in packs {
        stack.push_lowest(Arc::new(DirSource::new(pack)));
    }
    stack
}

fn load_textures(
    packs: &[PathBuf],
    opts: &flipbook::LoadOptions,
) -> anyhow::Result<flipbook::TextureMap<flipbook::TextureData>> {
    let loader =
        flipbook::TextureDataLoader::new(flipbook::PluginRegistry::with_defaults(), opts.clone());
    let cache = flipbook::TextureCache::new(loader, opts.threads)?;
    let report = cache.load(&pack_stack(packs), 0u32)?;
    for location in &report.failed {
        eprintln!("failed: {location}");
    }
    Ok(cache.get(&0))
}

fn cmd_inspect(args: InspectArgs, opts: &flipbook::LoadOptions) -> anyhow::Result<()> {
    let textures = load_textures(&args.packs, opts)?;
    for (location, data) in textures.iter() {
        let sections: Vec<&str> = data.sections().collect();
        println!(
            "{location}: {} frames of {}x{} [{}]",
            data.frame_count(),
            data.frame_width(),
            data.frame_height(),
            sections.join(", ")
        );
    }
    eprintln!("{} animated textures", textures.len());
    Ok(())
}

fn cmd_animate(args: AnimateArgs, opts: &flipbook::LoadOptions) -> anyhow::Result<()> {
    let location: flipbook::ResourceLocation = args.texture.parse()?;
    let textures = load_textures(&args.packs, opts)?;
    let data = textures
        .get(&location)
        .with_context(|| format!("'{location}' is not an animated texture in the given packs"))?;

    let plugins = flipbook::PluginRegistry::with_defaults();
    let render = flipbook::RenderThread::current();
    let (width, height) = (data.frame_width(), data.frame_height());
    let mip = max_mipmap_level(width, height, opts.mipmap_level);

    let uploader = Arc::new(MemoryUploader::new(width, height, mip));
    let target = flipbook::UploadTarget {
        uploader: uploader.clone(),
        x: 0,
        y: 0,
    };
    let texture = data.assemble(&plugins, opts, Some(target))?;

    let mut registry = flipbook::TextureRegistry::new();
    registry.register(location.clone(), texture)?;
    for _ in 0..args.ticks {
        registry.tick_all();
    }
    registry.bind(&location, &render.handle())?;
    render.run_pending()?;

    anyhow::ensure!(uploader.upload_count() > 0, "texture was never uploaded");
    let pixels = uploader.level_pixels(0).context("uploader has no level 0")?;
    let png = flipbook::frame::decode::encode_png(width, height, &pixels)?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    registry.close_all();

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vatbake", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake a per-frame snapshot document into offset/normal textures.
    Frames(FramesArgs),
    /// Bake a shape-key snapshot document into UV morph channels.
    Morphs(MorphsArgs),
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input snapshot document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for the emitted textures and reports.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct MorphsArgs {
    /// Input snapshot document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for the emitted layers and reports.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(serde::Deserialize)]
struct FrameDoc {
    config: vatbake::FrameBakeConfig,
    input: vatbake::FrameBakeInput,
}

#[derive(serde::Deserialize)]
struct MorphDoc {
    config: vatbake::ShapeKeyBakeConfig,
    input: vatbake::ShapeKeyBakeInput,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frames(args) => cmd_frames(args),
        Command::Morphs(args) => cmd_morphs(args),
    }
}

fn read_doc<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| "parse snapshot document JSON")
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), value)
        .with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let doc: FrameDoc = read_doc(&args.in_path)?;
    let out = vatbake::bake_frames(&doc.config, &doc.input)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create '{}'", args.out_dir.display()))?;

    let offsets_path = args.out_dir.join(format!("{}.exr", out.offset_name));
    image::DynamicImage::ImageRgba32F(out.offsets.clone())
        .save(&offsets_path)
        .with_context(|| format!("write '{}'", offsets_path.display()))?;

    let normals_path = args.out_dir.join(format!("{}.png", out.normal_name));
    out.normals
        .save(&normals_path)
        .with_context(|| format!("write '{}'", normals_path.display()))?;

    write_json(&args.out_dir.join("vertex_anim.json"), &out.anim_uv)?;
    write_json(&args.out_dir.join("report.json"), &out.report)?;

    println!(
        "baked {} frames x {} vertices (scale {}) into {}",
        out.offsets.height(),
        out.offsets.width(),
        out.report.scale_factor,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_morphs(args: MorphsArgs) -> anyhow::Result<()> {
    let doc: MorphDoc = read_doc(&args.in_path)?;
    let out = vatbake::bake_shape_keys(&doc.config, &doc.input)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create '{}'", args.out_dir.display()))?;

    write_json(&args.out_dir.join("morph_layers.json"), &out.uv_layers)?;
    if let Some(normals) = &out.normals {
        write_json(&args.out_dir.join("normals.json"), normals)?;
    }
    write_json(&args.out_dir.join("report.json"), &out.report)?;

    println!(
        "packed {} UV layers (scale {}) into {}",
        out.uv_layers.len(),
        out.report.scale_factor,
        args.out_dir.display()
    );
    Ok(())
}

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use wiibundle::manifest::{MANIFEST_FILE, Manifest};
use wiibundle::pack::ZipPacker;
use wiibundle::patcher::{self, BinaryArtifact, ContainerFormat, PCK_SECTION};
use wiibundle::{ExportContext, ExportPreset, args, export};

#[derive(Parser, Debug)]
#[command(author, version, about = "Package projects as Homebrew Channel bundles for the Wii", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a project into a bundle directory
    Export {
        /// JSON export preset
        #[arg(long, value_name = "PRESET")]
        preset: Utf8PathBuf,
        /// Output path; the bundle is written to its directory
        #[arg(long, value_name = "PATH")]
        output: Utf8PathBuf,
        /// Use the debug template
        #[arg(long)]
        debug: bool,
        /// Project directory to pack
        #[arg(long, value_name = "DIR", default_value = ".")]
        project: Utf8PathBuf,
        /// Project icon, copied as icon.png
        #[arg(long, value_name = "PNG")]
        icon: Option<Utf8PathBuf>,
    },
    /// Check that a preset's export templates exist
    Check {
        #[arg(long, value_name = "PRESET")]
        preset: Utf8PathBuf,
    },
    /// Show the manifest and embedded pack location of a bundle
    Inspect {
        #[arg(value_name = "BUNDLE_DIR")]
        bundle: Utf8PathBuf,
    },
    /// Record an embedded pack location in an ELF's "pck" section
    Patch {
        #[arg(value_name = "BINARY")]
        binary: Utf8PathBuf,
        start: i64,
        size: i64,
    },
    /// Print the launch arguments an argument string expands to
    Tokenize {
        #[arg(value_name = "ARGUMENTS")]
        arguments: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Export {
            preset,
            output,
            debug,
            project,
            icon,
        } => run_export(&preset, &output, debug, &project, icon),
        Command::Check { preset } => {
            let preset = ExportPreset::from_file(&preset)?;
            let readiness = preset.can_export();
            for err in &readiness.errors {
                println!("{}", err);
            }
            if !readiness.valid {
                bail!("No usable export template configured");
            }
            println!("OK");
            Ok(())
        }
        Command::Inspect { bundle } => inspect(&bundle),
        Command::Patch { binary, start, size } => {
            patcher::patch(&binary, start, size).with_context(|| format!("Failed to patch {}", binary))?;
            println!("Patched {}: pck at {:#x}, {} bytes", binary, start, size);
            Ok(())
        }
        Command::Tokenize { arguments } => {
            for arg in args::tokenize(&arguments) {
                println!("{}", arg);
            }
            Ok(())
        }
    }
}

fn run_export(
    preset_path: &Utf8Path,
    output: &Utf8Path,
    debug: bool,
    project: &Utf8Path,
    icon: Option<Utf8PathBuf>,
) -> Result<()> {
    let preset = ExportPreset::from_file(preset_path)?;
    let mut packer = ZipPacker::new(project);
    if let Some(dir) = output.parent().filter(|d| !d.as_str().is_empty()) {
        packer = packer.exclude(dir);
    }
    let mut ctx = ExportContext::new(&packer);
    if let Some(icon) = icon {
        ctx = ctx.with_icon(icon);
    }

    let bundle = export(&mut ctx, &preset, debug, output)
        .with_context(|| format!("Export to {} failed", output))?;

    println!("Boot binary: {}", bundle.boot);
    if let Some(icon) = &bundle.icon {
        println!("Icon:        {}", icon);
    }
    match (&bundle.pack, &bundle.embedded) {
        (Some(pack), _) => println!("Pack:        {}", pack),
        (None, Some(spec)) => println!("Pack:        embedded at {:#x} ({} bytes)", spec.start, spec.size),
        (None, None) => {}
    }
    println!("Manifest:    {}", bundle.manifest);
    Ok(())
}

fn inspect(bundle: &Utf8Path) -> Result<()> {
    let manifest = Manifest::from_file(bundle.join(MANIFEST_FILE))?;
    println!("Name:        {}", manifest.name);
    println!("Coder:       {}", manifest.coder);
    println!("Version:     {}", manifest.version);
    println!("Released:    {}", manifest.release_date);
    println!("Summary:     {}", manifest.short_description);
    println!("AHB access:  {}", if manifest.ahb_access { "yes" } else { "no" });
    println!("Arguments:");
    for arg in &manifest.arguments {
        println!("  {}", arg);
    }

    for ext in ["elf", "dol"] {
        let boot = bundle.join(format!("boot.{}", ext));
        if !boot.is_file() {
            continue;
        }
        let artifact = BinaryArtifact::identify(&boot)?;
        match (artifact.format, artifact.width) {
            (ContainerFormat::Elf, Some(width)) => {
                println!("Boot binary: {} (ELF{}, big-endian)", boot, width.bits());
                match patcher::read_section(&boot, PCK_SECTION)? {
                    Some(rec) if rec.size > 0 => {
                        println!("Embedded pack: offset {:#x}, {} bytes", rec.offset, rec.size)
                    }
                    Some(_) => println!("Embedded pack: none (empty pck section)"),
                    None => println!("Embedded pack: none (no pck section)"),
                }
            }
            _ => println!("Boot binary: {} (DOL)", boot),
        }
    }
    Ok(())
}

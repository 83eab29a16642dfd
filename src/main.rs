use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use fauxpost::editors::engagement::{Counter, EngagementPreset};
use fauxpost::editors::profile::{self, AvatarUpload};
use fauxpost::editors::timestamp::{self, TimePreset};
use fauxpost::storage::FileStorage;
use fauxpost::{
    EngagementPatch, ExportFormat, ProfilePatch, SettingsPatch, Studio, StudioConfig, Theme,
    TimeFormat,
};

#[derive(Parser)]
#[command(name = "fauxpost", version, about = "Compose a fake post, preview it, export it as an image")]
struct Cli {
    /// Directory holding the stored post
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Display limit for post text
    #[arg(long, global = true)]
    text_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the preview (or the stored JSON)
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Edit the author profile
    Profile(ProfileArgs),
    /// Set the post text
    Text {
        text: Option<String>,
        /// Use one of the quick templates (0-based)
        #[arg(long, conflicts_with = "text")]
        template: Option<usize>,
    },
    /// Edit the timestamp or its display mode
    Time(TimeArgs),
    /// Edit engagement counters (accepts 15.3K, 1,234, 2M)
    Engagement(EngagementArgs),
    /// Edit cosmetic settings
    Settings(SettingsArgs),
    /// Replace the post with defaults
    Reset,
    /// Load a post snapshot from a JSON file
    Load { file: PathBuf },
    /// Write the current post snapshot to a JSON file
    Save { file: PathBuf },
    /// Export the preview as an image
    Export(ExportArgs),
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    followers: Option<String>,
    #[arg(long)]
    verified: Option<bool>,
    #[arg(long, conflicts_with = "verified")]
    toggle_verified: bool,
    /// Image file to use as avatar (max 5MB)
    #[arg(long)]
    avatar: Option<PathBuf>,
    #[arg(long, conflicts_with = "avatar")]
    clear_avatar: bool,
}

#[derive(Args)]
struct TimeArgs {
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// HH:MM
    #[arg(long)]
    time: Option<String>,
    /// now, 1h, 3h, 1d, 1w, 1mo
    #[arg(long)]
    preset: Option<String>,
    /// relative or absolute
    #[arg(long)]
    format: Option<String>,
}

#[derive(Args)]
struct EngagementArgs {
    #[arg(long)]
    likes: Option<String>,
    #[arg(long)]
    retweets: Option<String>,
    #[arg(long)]
    comments: Option<String>,
    #[arg(long)]
    quotes: Option<String>,
    /// Empty string hides views
    #[arg(long)]
    views: Option<String>,
    /// Viral, Popular, Moderate, Low, Zero
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Args)]
struct SettingsArgs {
    #[arg(long)]
    theme: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    show_metrics: Option<bool>,
    #[arg(long)]
    export_format: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    /// png or jpg
    #[arg(long)]
    format: Option<String>,
    /// JPEG quality, 0.1 to 1.0
    #[arg(long)]
    quality: Option<f32>,
    /// 1, 2 or 3
    #[arg(long)]
    scale: Option<f32>,
    /// Directory to write the image into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn merge_engagement(into: &mut EngagementPatch, from: EngagementPatch) {
    into.likes = from.likes.or(into.likes);
    into.retweets = from.retweets.or(into.retweets);
    into.comments = from.comments.or(into.comments);
    into.quotes = from.quotes.or(into.quotes);
    into.views = from.views.or(into.views);
}

#[cfg(feature = "raster")]
fn avatar_upload(_path: &std::path::Path, bytes: Vec<u8>) -> AvatarUpload {
    AvatarUpload::sniffed(bytes)
}

#[cfg(not(feature = "raster"))]
fn avatar_upload(path: &std::path::Path, bytes: Vec<u8>) -> AvatarUpload {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    };
    AvatarUpload::new(mime, bytes)
}

fn edit_profile(studio: &mut Studio<FileStorage>, args: ProfileArgs) -> anyhow::Result<()> {
    let mut patch = ProfilePatch {
        username: args.username,
        display_name: args.display_name.map(|n| profile::display_name_patch(&n).display_name.unwrap_or(n)),
        followers: args.followers,
        verified: args.verified,
        ..Default::default()
    };
    if args.toggle_verified {
        patch.verified = profile::toggle_verified(&studio.post().profile).verified;
    }
    if args.clear_avatar {
        patch.avatar = profile::clear_avatar().avatar;
    }
    if let Some(path) = args.avatar {
        let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        // Rejections are shown to the user and leave the profile untouched
        match avatar_upload(&path, bytes).into_patch() {
            Ok(p) => patch.avatar = p.avatar,
            Err(e) => bail!("{}", e),
        }
    }
    studio.store_mut().update_profile(patch);
    Ok(())
}

fn edit_time(studio: &mut Studio<FileStorage>, args: TimeArgs) -> anyhow::Result<()> {
    if let Some(p) = args.preset {
        match TimePreset::parse(&p) {
            Some(preset) => {
                studio.apply_content(Some(preset.patch(Utc::now())));
            }
            None => bail!("unknown time preset {:?}", p),
        }
    }
    if let Some(d) = args.date {
        let patch = timestamp::date_patch(&studio.post().content, &d);
        if !studio.apply_content(patch) {
            log::warn!("ignoring unparsable date {:?}", d);
        }
    }
    if let Some(t) = args.time {
        let patch = timestamp::time_patch(&studio.post().content, &t);
        if !studio.apply_content(patch) {
            log::warn!("ignoring unparsable time {:?}", t);
        }
    }
    if let Some(f) = args.format {
        match TimeFormat::parse(&f) {
            Some(fmt) => {
                studio.apply_content(Some(timestamp::time_format_patch(fmt)));
            }
            None => bail!("time format must be relative or absolute"),
        }
    }
    Ok(())
}

fn edit_engagement(studio: &mut Studio<FileStorage>, args: EngagementArgs) -> anyhow::Result<()> {
    let mut patch = EngagementPatch::default();
    if let Some(name) = args.preset {
        match EngagementPreset::find(&name) {
            Some(preset) => patch = preset.patch(),
            None => bail!("unknown engagement preset {:?}", name),
        }
    }
    let fields = [
        (Counter::Likes, args.likes),
        (Counter::Retweets, args.retweets),
        (Counter::Comments, args.comments),
        (Counter::Quotes, args.quotes),
        (Counter::Views, args.views),
    ];
    for (counter, raw) in fields {
        if let Some(raw) = raw {
            merge_engagement(&mut patch, counter.patch(&raw));
        }
    }
    studio.store_mut().update_engagement(patch);
    Ok(())
}

fn edit_settings(studio: &mut Studio<FileStorage>, args: SettingsArgs) -> anyhow::Result<()> {
    let theme = match args.theme {
        Some(t) => Some(Theme::parse(&t).with_context(|| format!("unknown theme {:?}", t))?),
        None => None,
    };
    let export_format = match args.export_format {
        Some(f) => Some(ExportFormat::parse(&f).with_context(|| format!("unknown export format {:?}", f))?),
        None => None,
    };
    studio.store_mut().update_settings(SettingsPatch {
        theme,
        language: args.language,
        show_metrics: args.show_metrics,
        export_format,
    });
    if let Some(format) = export_format {
        studio.set_export_format(format);
    }
    Ok(())
}

#[cfg(feature = "raster")]
async fn export(studio: &mut Studio<FileStorage>, args: ExportArgs) -> anyhow::Result<()> {
    use fauxpost::export::DirectorySink;

    let mut config = studio.export_config();
    if let Some(f) = args.format {
        config.format = ExportFormat::parse(&f).with_context(|| format!("unknown export format {:?}", f))?;
    }
    if let Some(q) = args.quality {
        config.quality = q;
    }
    if let Some(s) = args.scale {
        config.scale = s;
    }
    if config != studio.export_config() {
        studio.set_export_config(config);
    }

    studio.exporter_mut().on_notice(|notice| eprintln!("{}", notice.message()));
    studio.render(Utc::now());
    let sink = DirectorySink::new(args.out_dir);
    let receipt = studio.export(&fauxpost::RasterCapture, &sink).await?;
    println!("{}", receipt.path.display());
    Ok(())
}

#[cfg(not(feature = "raster"))]
async fn export(_studio: &mut Studio<FileStorage>, _args: ExportArgs) -> anyhow::Result<()> {
    bail!("this build has no raster backend; rebuild with the `raster` feature")
}

fn show(studio: &Studio<FileStorage>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", studio.store().to_record_json()?);
        return Ok(());
    }
    print!("{}", studio.preview(Utc::now()).text_snapshot());
    let status = studio.text_status();
    println!("--\n{}", status);
    if !status.can_submit {
        println!("(post text is empty or over the limit)");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = StudioConfig::default();
    if let Some(dir) = cli.store_dir {
        config.storage_dir = dir;
    }
    if let Some(limit) = cli.text_limit {
        config.text_limit = limit;
    }
    let storage = FileStorage::in_dir(&config.storage_dir);
    let mut studio = Studio::open(config, storage)?;

    match cli.command {
        Command::Show { json } => return show(&studio, json),
        Command::Profile(args) => edit_profile(&mut studio, args)?,
        Command::Text { text, template } => {
            let accepted = match (text, template) {
                (_, Some(i)) => studio.apply_content(studio.gate().template(i)),
                (Some(t), None) => studio.edit_text(&t),
                (None, None) => bail!("give the text or --template"),
            };
            if !accepted {
                log::info!("text longer than {} characters ignored", studio.gate().hard_cap());
            }
        }
        Command::Time(args) => edit_time(&mut studio, args)?,
        Command::Engagement(args) => edit_engagement(&mut studio, args)?,
        Command::Settings(args) => edit_settings(&mut studio, args)?,
        Command::Reset => {
            studio.store_mut().reset_post();
        }
        Command::Load { file } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            studio.store_mut().load_post_json(&raw)?;
        }
        Command::Save { file } => {
            let json = serde_json::to_string_pretty(studio.post())?;
            std::fs::write(&file, json).with_context(|| format!("writing {}", file.display()))?;
            return Ok(());
        }
        Command::Export(args) => return export(&mut studio, args).await,
    }

    show(&studio, false)
}

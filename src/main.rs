use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use episodic::catalog::{Catalog, FileCatalog};
use episodic::config::Config;
use episodic::feed::{
    EpisodeKind, EpisodeWithShow, FeedApi, FeedItem, FeedType, PublishEpisodeInput,
    ShowEpisodeEntry, DEFAULT_SHOW_TITLE,
};
use episodic::storage::{Database, DatabaseError, NewDraft, CREATOR_STORE_KEY};
use episodic::util::{generate_id, pad_to_width, sanitize_title};

/// Get the config directory path (~/.config/episodic/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("episodic"))
}

#[derive(Parser, Debug)]
#[command(name = "episodic", about = "Resolve show feeds and publish episodes from the terminal")]
struct Args {
    /// Config file (defaults to ~/.config/episodic/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a feed (new, continue, library, newShowsOnly, local)
    Feed {
        /// Defaults to `default_feed` from the config file
        feed_type: Option<FeedType>,

        /// Filter to eligible shows and include specials
        #[arg(long)]
        mixed: bool,

        #[arg(long)]
        json: bool,
    },

    /// Resolve a show and list its episodes and drafts
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show one episode with its previous and next episode
    Episode {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show one special of the `new` feed
    Special {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// List shows, episodes and specials tagged with a topic
    Topic {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Create a draft with the next free episode number
    Draft {
        show_id: String,
        title: String,

        #[arg(long, default_value_t = 1)]
        season: u32,

        #[arg(long)]
        trailer: bool,
    },

    /// Publish an episode, optionally from a draft
    Publish {
        show_id: String,
        title: String,

        #[arg(long)]
        season: Option<u32>,

        #[arg(long)]
        episode: Option<u32>,

        #[arg(long)]
        trailer: bool,

        /// Title for a show this device has never seen
        #[arg(long, value_name = "TITLE")]
        show_title: Option<String>,

        /// Draft this publication replaces
        #[arg(long, value_name = "ID")]
        draft: Option<String>,

        #[arg(long, value_name = "URL", default_value = "")]
        video_url: String,

        /// Length in seconds
        #[arg(long, default_value_t = 0)]
        duration: u32,
    },

    /// Clear every show, draft and publication made on this device
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        tracing::info!(path = %config_dir.display(), "Created config directory");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = config.database_path_in(&config_dir);
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another episodic process is using the database. Please wait for it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    let catalog = match config.catalog_path_in(&config_dir) {
        Some(path) => {
            Catalog::with_upstream(Arc::new(FileCatalog::new(path)), config.upstream_timeout())
        }
        None => Catalog::mock(),
    };
    let mut api = FeedApi::load(catalog, &db)
        .await
        .context("Failed to load creator store")?;

    let width = config.title_width;
    match args.command {
        Command::Feed {
            feed_type,
            mixed,
            json,
        } => {
            let feed_type = match feed_type {
                Some(t) => t,
                None => config
                    .default_feed_type()
                    .context("Invalid default_feed in config")?,
            };
            if mixed {
                let items = api.get_mixed_feed(feed_type).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&items)?);
                } else {
                    for item in &items {
                        match item {
                            FeedItem::Episode(e) => println!("{}", episode_row(e, width)),
                            FeedItem::Special(s) => println!(
                                "  *   {}  [{:?}]",
                                pad_to_width(&sanitize_title(&s.title), width),
                                s.kind
                            ),
                        }
                    }
                }
            } else {
                let items = api.get_feed(feed_type).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&items)?);
                } else {
                    for item in &items {
                        println!("{}", episode_row(item, width));
                    }
                }
            }
            if api.catalog().is_degraded() {
                eprintln!("Warning: catalog source unavailable, showing built-in catalog");
            }
        }

        Command::Show { id, json } => {
            let Some(resolved) = api.resolve_show_by_id(&id).await else {
                anyhow::bail!("Show not found: {}", id);
            };
            let entries = api.show_episode_overlay(&id).await;
            if json {
                let out = serde_json::json!({ "show": resolved, "episodes": entries });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let show = &resolved.show;
                println!(
                    "{} ({}, {:?})",
                    sanitize_title(&show.title),
                    show.id,
                    resolved.source
                );
                if !show.topic_ids.is_empty() {
                    println!("topics: {}", show.topic_ids.join(", "));
                }
                for entry in &entries {
                    println!("{}", entry_row(entry, width));
                }
            }
        }

        Command::Episode { id, json } => {
            let Some(item) = api.get_episode_by_id(&id).await else {
                anyhow::bail!("Episode not found: {}", id);
            };
            let (prev, next) = api.episode_neighbors(&id).await;
            if json {
                let out = serde_json::json!({ "item": item, "prev": prev, "next": next });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", episode_row(&item, width));
                if let Some(prev) = &prev {
                    println!("prev: {}", episode_row(prev, width));
                }
                if let Some(next) = &next {
                    println!("next: {}", episode_row(next, width));
                }
            }
        }

        Command::Special { id, json } => {
            let Some(special) = api.get_special_by_id(&id).await else {
                anyhow::bail!("Special not found: {}", id);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&special)?);
            } else {
                println!("{}  [{:?}]", sanitize_title(&special.title), special.kind);
                if !special.attached_show_ids.is_empty() {
                    println!("shows: {}", special.attached_show_ids.join(", "));
                }
                if !special.attached_topic_ids.is_empty() {
                    println!("topics: {}", special.attached_topic_ids.join(", "));
                }
            }
        }

        Command::Topic { id, json } => {
            let shows = api.get_shows_by_topic(&id).await;
            let episodes = api.get_episodes_by_topic(&id).await;
            let specials = api.get_specials_by_topic(&id).await;
            if json {
                let out = serde_json::json!({
                    "shows": shows,
                    "episodes": episodes,
                    "specials": specials,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Shows ({})", shows.len());
                for show in &shows {
                    println!("  {}  {}", pad_to_width(&sanitize_title(&show.title), width), show.id);
                }
                println!("Episodes ({})", episodes.len());
                for item in &episodes {
                    println!("{}", episode_row(item, width));
                }
                println!("Specials ({})", specials.len());
                for special in &specials {
                    println!("  {}", sanitize_title(&special.title));
                }
            }
        }

        Command::Draft {
            show_id,
            title,
            season,
            trailer,
        } => {
            if api.resolve_show_by_id(&show_id).await.is_none() {
                api.creator_mut()
                    .add_show(show_id.clone(), DEFAULT_SHOW_TITLE, None, None);
            }
            let number = api.next_episode_number(&show_id, season).await?;
            let id = generate_id("draft");
            api.creator_mut().add_draft_episode(NewDraft {
                id: id.clone(),
                show_id,
                title,
                season_number: season,
                episode_number: number,
                episode_type: if trailer {
                    EpisodeKind::Trailer
                } else {
                    EpisodeKind::Episode
                },
                ..Default::default()
            });
            api.save(&db).await.context("Failed to save creator store")?;
            println!("Created draft {} (S{}E{})", id, season, number);
        }

        Command::Publish {
            show_id,
            title,
            season,
            episode,
            trailer,
            show_title,
            draft,
            video_url,
            duration,
        } => {
            let item = api
                .publish_episode(PublishEpisodeInput {
                    show_id,
                    show_title,
                    title,
                    season_number: season,
                    episode_number: episode,
                    episode_type: trailer.then_some(EpisodeKind::Trailer),
                    video_url,
                    duration,
                    draft_id: draft,
                    ..Default::default()
                })
                .await?;
            api.save(&db).await.context("Failed to save creator store")?;
            println!("Published {}", item.episode.id);
        }

        Command::Reset => {
            api.creator_mut().reset();
            let removed = db
                .remove(CREATOR_STORE_KEY)
                .await
                .context("Failed to clear creator store")?;
            tracing::info!(removed, "Creator store reset");
            println!("Creator store cleared.");
        }
    }

    Ok(())
}

fn episode_row(item: &EpisodeWithShow, width: usize) -> String {
    let episode = &item.episode;
    let slot = if episode.is_trailer() {
        format!("S{} TR ", episode.season())
    } else {
        format!("S{}E{:02}", episode.season(), episode.number())
    };
    format!(
        "{}  {}  {}",
        slot,
        pad_to_width(&sanitize_title(&episode.title), width),
        sanitize_title(&item.show.title)
    )
}

fn entry_row(entry: &ShowEpisodeEntry, width: usize) -> String {
    let slot = if entry.is_trailer {
        format!("S{} TR ", entry.season_number)
    } else {
        format!("S{}E{:02}", entry.season_number, entry.episode_number)
    };
    let marker = if entry.is_draft { "draft" } else { "" };
    format!(
        "{}  {}  {}",
        slot,
        pad_to_width(&sanitize_title(&entry.title), width),
        marker
    )
}

//! toctl - command line client for managing a textonly blog.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use textonly::client::{ApiClient, ClientConfig, HOST_ENV};
use textonly::db::models::{BlogPost, NewBlogPost, Social};

/// CLI tools for managing textonly
#[derive(Debug, Parser)]
#[command(name = "toctl")]
#[command(version)]
#[command(about = "CLI tools for managing textonly", long_about = None)]
struct Args {
    /// Config file (default is <config dir>/textonly/toctl.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the textonly host
    #[arg(long, global = true, env = HOST_ENV)]
    host: Option<String>,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Get a resource from the textonly host
    Get {
        #[command(subcommand)]
        resource: GetResource,

        /// Output JSON
        #[arg(short, long, global = true)]
        json: bool,
    },

    /// Create a resource on the textonly host
    Create {
        #[command(subcommand)]
        resource: CreateResource,
    },

    /// Delete a resource from the textonly host
    Delete {
        #[command(subcommand)]
        resource: DeleteResource,
    },
}

#[derive(Debug, Subcommand)]
enum GetResource {
    /// Status, environment and version of the host
    Host,
    /// All blog posts, or the one with ID
    Blogpost { id: Option<i64> },
    /// All social links, or the one with ID
    Social { id: Option<i64> },
    /// The author profile
    User {
        #[arg(default_value_t = 1)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum CreateResource {
    /// Publish a blog post from a Markdown file
    Blogpost {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        lead: String,
        /// Markdown file holding the post content
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum DeleteResource {
    /// Delete the blog post with ID
    Blogpost { id: i64 },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    textonly::logging::init_cli(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let client = ApiClient::new(&config)?;

    match args.command {
        Command::Get { resource, json } => get(&client, resource, json).await,
        Command::Create {
            resource: CreateResource::Blogpost { title, lead, file },
        } => {
            let post = std::fs::read_to_string(&file)
                .with_context(|| format!("unable to read {}", file.display()))?;
            if title.trim().is_empty() {
                bail!("title must not be empty");
            }

            let created = client
                .create_post(&NewBlogPost { title, lead, post })
                .await
                .context("unable to create blog post")?;
            println!("Created blog post {}", created.data.id);
            Ok(())
        }
        Command::Delete {
            resource: DeleteResource::Blogpost { id },
        } => {
            let deleted = client
                .delete_post(id)
                .await
                .context("unable to delete blog post")?;
            println!("Deleted blog post {} ({} rows)", deleted.id, deleted.rows_affected);
            Ok(())
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let config = match (&args.config, ClientConfig::default_path()) {
        (Some(path), _) => ClientConfig::load(path, true)?,
        (None, Some(path)) => ClientConfig::load(&path, false)?,
        (None, None) => ClientConfig::default(),
    };

    Ok(config.with_host(args.host.clone()))
}

async fn get(client: &ApiClient, resource: GetResource, json: bool) -> anyhow::Result<()> {
    match resource {
        GetResource::Host => {
            let health = client.health().await.context("unable to get host status")?;
            output(json, &health, || {
                format!(
                    "Status: {}, Environment: {}, Version: {}",
                    health.status, health.environment, health.version
                )
            })
        }
        GetResource::Blogpost { id: Some(id) } => {
            let post = client.post(id).await.context("unable to get blog post")?;
            output(json, &post, || {
                format!("{}\n{}", post_line(&post.data), post.data.lead)
            })
        }
        GetResource::Blogpost { id: None } => {
            let posts = client.posts().await.context("unable to get blog posts")?;
            output(json, &posts, || {
                posts.data.iter().map(post_line).collect::<Vec<_>>().join("\n")
            })
        }
        GetResource::Social { id: Some(id) } => {
            let social = client.social(id).await.context("unable to get social data")?;
            output(json, &social, || social_line(&social.data))
        }
        GetResource::Social { id: None } => {
            let socials = client.socials().await.context("unable to get social data")?;
            output(json, &socials, || {
                socials.data.iter().map(social_line).collect::<Vec<_>>().join("\n")
            })
        }
        GetResource::User { id } => {
            let user = client.user(id).await.context("unable to get user")?;
            output(json, &user, || {
                format!(
                    "ID: {}, Name: {}\n{}",
                    user.data.id, user.data.name, user.data.summary
                )
            })
        }
    }
}

fn output<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        let text = text();
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}

fn post_line(post: &BlogPost) -> String {
    format!(
        "ID: {}, Title: {}, Created: {}, Last update: {}",
        post.id,
        post.title,
        post.created.format("%Y-%m-%d %H:%M"),
        post.last_update.format("%Y-%m-%d %H:%M"),
    )
}

fn social_line(social: &Social) -> String {
    format!(
        "ID: {}, Platform: {}, Link: {}",
        social.id, social.social_platform, social.link
    )
}

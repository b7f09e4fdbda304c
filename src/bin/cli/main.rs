use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloud_storage_facade::{
    BucketName, CloudStorageService, ContentSource, ObjectKey, app::create_app_from_config,
};
use futures::TryStreamExt;
use std::{io::Write, path::PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloud-storage-cli")]
#[command(about = "Manage buckets and files in cloud object storage", long_about = None)]
struct Cli {
    /// Properties file holding project.id and credential.json.path
    #[arg(
        short,
        long,
        env = "CLOUDSTORAGE_CONFIG",
        default_value = "cloudstorage.properties"
    )]
    config: PathBuf,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage buckets
    Bucket {
        #[command(subcommand)]
        command: BucketCommands,
    },

    /// Manage files
    File {
        #[command(subcommand)]
        command: FileCommands,
    },
}

#[derive(Subcommand, Debug)]
enum BucketCommands {
    /// List the buckets of the configured project
    List,

    /// Create a bucket, leaving an existing one untouched
    Create { bucket: String },

    /// Delete an empty bucket
    Delete { bucket: String },

    /// Report whether a bucket exists
    Exists { bucket: String },
}

#[derive(Subcommand, Debug)]
enum FileCommands {
    /// Upload a local file
    Put {
        bucket: String,
        /// File path to upload
        file: PathBuf,
        /// Object key, defaults to the file name
        #[arg(short, long)]
        key: Option<String>,
        /// Folder to place the file in
        #[arg(short, long)]
        folder: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Download a file into a directory
    Get {
        bucket: String,
        key: String,
        /// Existing destination directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print a file to stdout
    Cat { bucket: String, key: String },

    /// Show a file's metadata
    Stat { bucket: String, key: String },

    /// List the files of a bucket
    List { bucket: String },

    /// Delete a file
    Delete { bucket: String, key: String },

    /// Create a folder marker
    Mkdir { bucket: String, name: String },
}

impl Cli {
    fn init_logging(&self) {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.to_lowercase()));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn bucket_name(raw: &str) -> Result<BucketName> {
    BucketName::new(raw).with_context(|| format!("Invalid bucket name '{}'", raw))
}

fn object_key(raw: &str) -> Result<ObjectKey> {
    ObjectKey::new(raw).with_context(|| format!("Invalid object key '{}'", raw))
}

async fn run_bucket(service: &impl CloudStorageService, command: BucketCommands) -> Result<()> {
    match command {
        BucketCommands::List => {
            let mut buckets = service.list_buckets();
            while let Some(bucket) = buckets.try_next().await? {
                println!("{}", bucket.name);
            }
        }
        BucketCommands::Create { bucket } => {
            let bucket = service.create_bucket(&bucket_name(&bucket)?).await?;
            println!("{}", bucket.name);
        }
        BucketCommands::Delete { bucket } => {
            if !service.delete_bucket(&bucket_name(&bucket)?).await? {
                anyhow::bail!("Bucket '{}' does not exist", bucket);
            }
        }
        BucketCommands::Exists { bucket } => {
            println!("{}", service.bucket_exists(&bucket_name(&bucket)?).await?);
        }
    }

    Ok(())
}

async fn run_file(service: &impl CloudStorageService, command: FileCommands) -> Result<()> {
    match command {
        FileCommands::Put {
            bucket,
            file,
            key,
            folder,
            content_type,
        } => {
            let bucket = bucket_name(&bucket)?;
            let name = match key {
                Some(key) => key,
                None => file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
                    .context("Cannot derive an object key from the file path")?,
            };
            let key = ObjectKey::compose(folder.as_deref(), &name)?;

            let blob = service
                .add_file(
                    &bucket,
                    &key,
                    ContentSource::path(file),
                    content_type.as_deref(),
                )
                .await?
                .with_context(|| format!("Bucket '{}' does not exist", bucket))?;
            println!("{} ({} bytes)", blob.id(), blob.size);
        }
        FileCommands::Get {
            bucket,
            key,
            output,
        } => {
            let path = service
                .get_as_local_file(&bucket_name(&bucket)?, &object_key(&key)?, &output)
                .await?
                .with_context(|| format!("'{}/{}' not found", bucket, key))?;
            println!("{}", path.display());
        }
        FileCommands::Cat { bucket, key } => {
            let content = service
                .read_file(&bucket_name(&bucket)?, &object_key(&key)?)
                .await?
                .with_context(|| format!("'{}/{}' not found", bucket, key))?;
            std::io::stdout().write_all(&content)?;
        }
        FileCommands::Stat { bucket, key } => {
            let blob = service
                .get_file(&bucket_name(&bucket)?, &object_key(&key)?)
                .await?
                .with_context(|| format!("'{}/{}' not found", bucket, key))?;
            println!("{:#?}", blob);
        }
        FileCommands::List { bucket } => {
            let mut files = service.list_files(&bucket_name(&bucket)?);
            while let Some(blob) = files.try_next().await? {
                println!("{:>12}  {}", blob.size, blob.name());
            }
        }
        FileCommands::Delete { bucket, key } => {
            if !service
                .delete_file(&bucket_name(&bucket)?, &object_key(&key)?)
                .await?
            {
                anyhow::bail!("'{}/{}' not found", bucket, key);
            }
        }
        FileCommands::Mkdir { bucket, name } => {
            let blob = service.create_folder(&bucket_name(&bucket)?, &name).await?;
            println!("{}", blob.id());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    let service = create_app_from_config(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Bucket { command } => run_bucket(&service, command).await,
        Commands::File { command } => run_file(&service, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "cloud-storage-cli",
            "--config",
            "dev.properties",
            "file",
            "put",
            "b1",
            "readme.txt",
            "--folder",
            "docs",
            "--content-type",
            "text/plain",
        ]);

        assert_eq!(cli.config, PathBuf::from("dev.properties"));
        match cli.command {
            Commands::File {
                command:
                    FileCommands::Put {
                        bucket,
                        folder,
                        content_type,
                        ..
                    },
            } => {
                assert_eq!(bucket, "b1");
                assert_eq!(folder.as_deref(), Some("docs"));
                assert_eq!(content_type.as_deref(), Some("text/plain"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

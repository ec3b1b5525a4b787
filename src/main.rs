use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use pv::{KdfConfig, KeyCache, Storage, Vault};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct Argon2Args {
    /// Argon2 memory cost in KiB (default: 65536)
    #[arg(long = "argon-mem")]
    mem_cost_kib: Option<u32>,

    /// Argon2 time cost / iterations (default: 3)
    #[arg(long = "argon-time")]
    time_cost: Option<u32>,

    /// Argon2 parallelism (default: 1)
    #[arg(long = "argon-parallelism")]
    parallelism: Option<u32>,
}

impl Argon2Args {
    fn to_kdf_config(&self) -> KdfConfig {
        KdfConfig {
            memory_cost_kib: self.mem_cost_kib,
            iterations: self.time_cost,
            parallelism: self.parallelism,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pv")]
#[command(
    version,
    about = "Password vault: named secrets in one file, protected by a master password."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Creates a new, empty vault
    #[command(arg_required_else_help = true)]
    Create {
        path: PathBuf,
        #[command(flatten)]
        argon2: Argon2Args,
    },

    /// Stores a secret by name (value and password are prompted)
    #[command(arg_required_else_help = true)]
    Store { key: String, path: PathBuf },

    /// Prints a secret by name
    #[command(arg_required_else_help = true)]
    Read { key: String, path: PathBuf },

    /// Deletes a secret by name
    #[command(arg_required_else_help = true)]
    Delete { key: String, path: PathBuf },

    /// Lists secret names
    #[command(arg_required_else_help = true)]
    List { path: PathBuf },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn require_existing(path: &Path) -> Result<()> {
    if !Storage::new(path).exists() {
        bail!("vault does not exist: {}", path.display());
    }
    if !path.is_file() {
        bail!("vault path is not a file: {}", path.display());
    }
    Ok(())
}

fn load(path: &Path) -> Result<Vault> {
    require_existing(path)?;
    Vault::load(path).with_context(|| format!("failed to load vault {}", path.display()))
}

fn save(vault: &Vault, path: &Path) -> Result<()> {
    vault
        .save(path)
        .with_context(|| format!("failed to save vault {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();

    match args.command {
        Commands::Create { path, argon2 } => {
            if Storage::new(&path).exists() {
                bail!("vault already exists: {}", path.display());
            }
            let kdf = argon2.to_kdf_config().resolve()?;
            let vault = Vault::initialize(kdf)?;
            save(&vault, &path)?;
            println!("vault created");
        }
        Commands::Store { key, path } => {
            require_existing(&path)?;
            let value = auth::read_secret_value()?;
            let password = auth::read_password()?;
            let mut vault = load(&path)?;

            let mut cache = KeyCache::new();
            vault
                .verify_password_with(&mut cache, password.as_bytes())
                .context("master password does not match the secrets already in this vault")?;
            vault.store_with(&mut cache, &key, value.as_bytes(), password.as_bytes())?;
            cache.clear();
            drop(password);

            save(&vault, &path)?;
            println!("stored secret '{key}'");
        }
        Commands::Read { key, path } => {
            require_existing(&path)?;
            let password = auth::read_password()?;
            let vault = load(&path)?;
            let secret = vault.read(&key, password.as_bytes())?;
            drop(password);
            println!("{}", String::from_utf8_lossy(&secret));
        }
        Commands::Delete { key, path } => {
            let mut vault = load(&path)?;
            vault.delete(&key)?;
            save(&vault, &path)?;
            println!("secret '{key}' deleted");
        }
        Commands::List { path } => {
            let vault = load(&path)?;
            for name in vault.list() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

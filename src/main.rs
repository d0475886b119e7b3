use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod auth;

use keymill::generator::{self, CharacterSet};
use keymill::kdf::{self, Argon2Kdf, Kdf, KdfKind, SALT_LEN};
use keymill::key::{CompositeKey, FileFactor, PasswordFactor};
use keymill::task;

#[derive(Debug, clap::Args)]
struct KdfArgs {
    /// KDF family: "argon2" or "aes-kdf"
    #[arg(long = "kdf", default_value = "argon2")]
    kind: String,

    /// Round count (default: the family's default)
    #[arg(long)]
    rounds: Option<u64>,

    /// Argon2 memory cost in KiB (default: 65536)
    #[arg(long = "argon-mem")]
    memory_kib: Option<u32>,

    /// Argon2 parallelism (default: 1)
    #[arg(long = "argon-parallelism")]
    parallelism: Option<u32>,
}

impl KdfArgs {
    fn kind(&self) -> Result<KdfKind> {
        match self.kind.as_str() {
            "argon2" => Ok(KdfKind::Argon2),
            "aes-kdf" => Ok(KdfKind::AesKdf),
            other => bail!("unknown KDF '{other}' (expected 'argon2' or 'aes-kdf')"),
        }
    }

    fn to_kdf(&self) -> Result<Box<dyn Kdf>> {
        let kind = self.kind()?;
        if !kind.is_memory_hard() && (self.memory_kib.is_some() || self.parallelism.is_some()) {
            bail!("--argon-mem/--argon-parallelism only apply to the argon2 KDF");
        }

        match kind {
            KdfKind::AesKdf => {
                let mut kdf = kind.new_kdf();
                if let Some(rounds) = self.rounds {
                    kdf.set_rounds(rounds).context("invalid round count")?;
                }
                Ok(kdf)
            }
            KdfKind::Argon2 => {
                let mut kdf = Argon2Kdf::default();
                if let Some(rounds) = self.rounds {
                    kdf.set_rounds(rounds).context("invalid round count")?;
                }
                if let Some(parallelism) = self.parallelism {
                    kdf.set_parallelism(parallelism)
                        .context("invalid parallelism")?;
                }
                if let Some(memory_kib) = self.memory_kib {
                    kdf.set_memory(memory_kib).context("invalid memory cost")?;
                }
                Ok(Box::new(kdf))
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "keymill")]
#[command(
    version,
    about = "Composite master-key derivation and KDF calibration for an offline password database."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Calibrates a KDF round count against a wall-clock target
    Benchmark {
        #[command(flatten)]
        kdf: KdfArgs,

        /// Target transform time in milliseconds
        #[arg(long, default_value_t = 1000)]
        target_ms: u64,
    },

    /// Derives the master key from a password and optional key files
    Derive {
        #[command(flatten)]
        kdf: KdfArgs,

        /// Key file factors, combined in the given order after the password
        #[arg(long = "key-file", value_name = "PATH")]
        key_files: Vec<PathBuf>,

        /// Transform salt as 64 hex characters (default: freshly random)
        #[arg(long, value_name = "HEX")]
        salt: Option<String>,
    },

    /// Generates a random password
    Generate {
        /// Password length in characters
        #[arg(long, default_value_t = 20)]
        length: usize,

        /// Include symbols
        #[arg(long, default_value_t = false)]
        symbols: bool,

        /// Exclude digits
        #[arg(long, default_value_t = false)]
        no_digits: bool,

        /// Exclude uppercase letters
        #[arg(long, default_value_t = false)]
        no_upper: bool,
    },

    /// Lists the available KDF families and their defaults
    KdfInfo,
}

fn parse_salt(hex_salt: Option<String>) -> Result<[u8; SALT_LEN]> {
    match hex_salt {
        Some(text) => {
            let bytes = hex::decode(text.trim()).context("salt is not valid hex")?;
            bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("salt must be exactly {SALT_LEN} bytes"))
        }
        None => Ok(kdf::generate_salt()?),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.command {
        Commands::Benchmark { kdf, target_ms } => {
            let kind = kdf.kind()?;
            let mut kdf = kdf.to_kdf()?;
            let target = Duration::from_millis(target_ms);

            let started = Instant::now();
            let result = task::run_and_wait(move || kdf::benchmark(&mut *kdf, target));
            let elapsed = started.elapsed();

            let (rounds, approximate) = match result {
                Ok(rounds) => (rounds, false),
                Err(keymill::KeyError::BenchmarkTimeout { rounds }) => (rounds, true),
                Err(e) => return Err(e.into()),
            };

            println!(
                "{rounds} rounds for ~{target_ms} ms ({} probes took {elapsed:?})",
                kind.label()
            );
            if approximate {
                eprintln!("warning: calibration did not fully converge; estimate is approximate");
            }
            if let Some(advisory) = kind.rounds_advisory(rounds) {
                match advisory {
                    kdf::RoundsAdvisory::TooLow => eprintln!(
                        "warning: {rounds} rounds is unusually low for {}; the database may be easy to crack",
                        kind.label()
                    ),
                    kdf::RoundsAdvisory::TooHigh => eprintln!(
                        "warning: {rounds} rounds is unusually high for {}; opening the database may take very long",
                        kind.label()
                    ),
                }
            }
        }
        Commands::Derive {
            kdf,
            key_files,
            salt,
        } => {
            let password = auth::read_password()?;
            let kdf = kdf.to_kdf()?;
            let salt = parse_salt(salt)?;

            let mut composite = CompositeKey::new();
            composite.add_factor(Box::new(PasswordFactor::new(&password)));
            drop(password);
            for path in key_files {
                composite.add_factor(Box::new(FileFactor::new(path)));
            }

            let key =
                task::run_and_wait(move || composite.transformed_key(&*kdf, &salt))?;

            println!("salt: {}", hex::encode(salt));
            println!("key:  {}", hex::encode(*key));
        }
        Commands::Generate {
            length,
            symbols,
            no_digits,
            no_upper,
        } => {
            let charset = CharacterSet {
                lower: true,
                upper: !no_upper,
                digits: !no_digits,
                symbols,
            };
            let password = generator::generate(length, charset)?;
            println!("{}", &*password);
        }
        Commands::KdfInfo => {
            for kind in KdfKind::ALL {
                let config = kind.new_kdf().config();
                println!(
                    "{} ({}): defaults {}",
                    kind.label(),
                    hex::encode(kind.uuid()),
                    serde_json::to_string(&config)?
                );
            }
        }
    }
    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use madeira_cli::commands::{dns, hash, package};
use madeira_cli::output::OutputFormat;
use madeira_lib::dns::{DEFAULT_WAIT_ATTEMPTS, DEFAULT_WAIT_DELAY};
use madeira_lib::{
    get_logger, LevelFilter, LoggingConfig, DEFAULT_ENTRY_NAME, DEFAULT_SKIP_MARKER, DEFAULT_TTL,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Madeira deployment utilities")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Write debug logs to stdout.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute base64 digests of deployment artifacts.
    Hash {
        /// Digest algorithm (sha224, sha256, sha384, sha512, sha512_224, sha512_256).
        #[arg(long, short = 'a', default_value = "sha256", global = true)]
        algorithm: String,

        #[command(subcommand)]
        source: HashSource,
    },
    /// Build zip archives for Lambda functions and layers.
    #[command(subcommand)]
    Package(PackageCommand),
    /// Read, update and wait for DNS records.
    #[command(subcommand)]
    Dns(DnsCommand),
}

#[derive(Subcommand, Debug)]
enum HashSource {
    /// Hash a file on disk.
    File { path: PathBuf },
    /// Hash a literal string.
    Data { text: String },
    /// Hash everything read from stdin.
    Stdin,
    /// Hash one member of a zip archive given as a path or URL.
    ZipMember { archive: String, member: String },
}

#[derive(Subcommand, Debug)]
enum PackageCommand {
    /// Package a single source file, or pass through an existing .zip.
    Function {
        source: PathBuf,
        /// Archive to write.
        #[arg(long, short = 'o')]
        output: PathBuf,
        /// Entry name inside the archive.
        #[arg(long, default_value = DEFAULT_ENTRY_NAME)]
        entry_name: String,
    },
    /// Package every file below a directory.
    Layer {
        root: PathBuf,
        /// Archive to write (default: <root>.zip).
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Skip directories whose path contains this marker.
        #[arg(long, default_value = DEFAULT_SKIP_MARKER)]
        exclude: String,
        /// Include every directory.
        #[arg(long, conflicts_with = "exclude")]
        no_exclude: bool,
        /// List the entries instead of writing an archive.
        #[arg(long)]
        list: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DnsCommand {
    /// Print the current value of a record.
    Get {
        name: String,
        #[arg(long = "type", short = 't', default_value = "CNAME")]
        record_type: String,
        /// Provider configuration file (default: ~/.godaddy-dns.json).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replace the value of a record.
    Set {
        name: String,
        value: String,
        #[arg(long = "type", short = 't', default_value = "CNAME")]
        record_type: String,
        #[arg(long, default_value_t = DEFAULT_TTL)]
        ttl: u32,
        /// Provider configuration file (default: ~/.godaddy-dns.json).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Poll public DNS until a host resolves to a value.
    Wait {
        host: String,
        value: String,
        #[arg(long = "type", short = 't', default_value = "CNAME")]
        record_type: String,
        #[arg(long, default_value_t = DEFAULT_WAIT_ATTEMPTS)]
        attempts: u32,
        #[arg(long, default_value_t = DEFAULT_WAIT_DELAY.as_secs())]
        delay_secs: u64,
        /// DNS-over-HTTPS JSON endpoint.
        #[arg(long)]
        resolver: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = cli.format;

    match cli.command {
        Command::Hash { algorithm, source } => {
            let algorithm = hash::parse_algorithm(&algorithm)?;
            match source {
                HashSource::File { path } => hash::handle_hash_file(&path, algorithm, format),
                HashSource::Data { text } => hash::handle_hash_data(&text, algorithm, format),
                HashSource::Stdin => hash::handle_hash_stdin(algorithm, format),
                HashSource::ZipMember { archive, member } => {
                    hash::handle_hash_zip_member(&archive, &member, algorithm, format)
                }
            }
        }
        Command::Package(PackageCommand::Function {
            source,
            output,
            entry_name,
        }) => package::handle_package_function(&source, &output, &entry_name, format),
        Command::Package(PackageCommand::Layer {
            root,
            output,
            exclude,
            no_exclude,
            list,
        }) => {
            let exclude = (!no_exclude).then_some(exclude.as_str());
            package::handle_package_layer(&root, output.as_deref(), exclude, list, format)
        }
        Command::Dns(DnsCommand::Get {
            name,
            record_type,
            config,
        }) => dns::handle_dns_get(&name, &record_type, config.as_deref(), format),
        Command::Dns(DnsCommand::Set {
            name,
            value,
            record_type,
            ttl,
            config,
        }) => dns::handle_dns_set(
            &name,
            &value,
            &record_type,
            ttl,
            config.as_deref(),
            format,
        ),
        Command::Dns(DnsCommand::Wait {
            host,
            value,
            record_type,
            attempts,
            delay_secs,
            resolver,
        }) => dns::handle_dns_wait(
            &host,
            &value,
            &record_type,
            attempts,
            Duration::from_secs(delay_secs),
            resolver.as_deref(),
            format,
        ),
    }
}

/// Logs stay off stdout unless `--verbose` is given, so command output can be piped.
fn init_logging(verbose: bool) {
    let config = LoggingConfig::from_env()
        .with_name("madeira")
        .with_stdout(verbose);
    let config = if verbose {
        config.with_level(LevelFilter::DEBUG)
    } else {
        config
    };
    get_logger(&config);
}

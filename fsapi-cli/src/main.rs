use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use fsapi_api::{
    ClientConfig, FsapiClient, ListQuery, ListResult, NodeRef, ProtocolError, Value, ValueKind,
};
use fsapi_sdk::logging::{self, LoggingMode};
use fsapi_sdk::{catalog, Radio};
use serde_json::json;
use tracing::debug;

/// Control a Frontier Silicon internet radio over FSAPI
///
/// Nodes can be given as catalog names (`volume`), paths relative to
/// `netRemote` (`sys.audio.volume`), full paths or numeric ids.
#[derive(Parser, Debug)]
#[command(name = "fsapi")]
#[command(version)]
#[command(group(ArgGroup::new("target").required(true).args(["url", "device_url"])))]
pub struct Args {
    /// FSAPI root URL, e.g. http://192.168.1.20/fsapi
    #[arg(long, env = "FSAPI_URL")]
    pub url: Option<String>,

    /// Device description URL to resolve the FSAPI root from
    #[arg(long, env = "FSAPI_DEVICE_URL")]
    pub device_url: Option<String>,

    /// Device PIN
    #[arg(long, env = "FSAPI_PIN", default_value = "1234", hide_env_values = true)]
    pub pin: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Log filter (error, warn, info, debug, trace or directives)
    #[arg(long, env = "FSAPI_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a node
    Get {
        node: String,
        /// Require this value type (u8, u16, u32, s8, s16, s32, text, bytes)
        #[arg(long)]
        kind: Option<ValueKind>,
    },
    /// Write a node
    Set {
        node: String,
        kind: ValueKind,
        value: String,
    },
    /// Read a list node
    List {
        node: String,
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a summary of the radio's state
    Status,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            return Err(anyhow!("Timeout must be positive"));
        }
        if let Command::List {
            page_size: Some(0), ..
        } = self.command
        {
            return Err(anyhow!("Page size must be at least 1"));
        }
        Ok(())
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::default().with_timeout(Duration::from_secs(self.timeout))
    }

    fn connect(&self) -> Result<FsapiClient> {
        let config = self.config();
        if let Some(device_url) = &self.device_url {
            return FsapiClient::connect(device_url, self.pin.clone(), config)
                .with_context(|| format!("Failed to resolve FSAPI endpoint from {}", device_url));
        }
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("Either --url or --device-url is required"))?;
        Ok(FsapiClient::with_config(url, self.pin.clone(), config))
    }
}

/// What a command does with a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeUse {
    Read,
    Write,
    List,
}

/// Map a user-supplied node name to a node reference and its catalog type
///
/// Catalog nodes are checked against `node_use` before anything is sent;
/// other names and ids pass through unchecked.
fn resolve_node(name: &str, node_use: NodeUse) -> Result<(NodeRef, Option<ValueKind>)> {
    if let Some(entry) = catalog::lookup(name) {
        let kind = match node_use {
            NodeUse::Read => Some(entry.read_kind()?),
            NodeUse::Write => Some(entry.write_kind()?),
            NodeUse::List => {
                entry.check_list()?;
                None
            }
        };
        return Ok((entry.node(), kind));
    }
    Ok(match name.parse::<u32>() {
        Ok(id) => (NodeRef::Id(id), None),
        Err(_) => (NodeRef::Name(name.to_string()), None),
    })
}

fn value_to_json(value: &Value) -> serde_json::Value {
    if let Some(v) = value.as_u32() {
        json!(v)
    } else if let Some(v) = value.as_i32() {
        json!(v)
    } else {
        json!(value.to_string())
    }
}

fn list_to_json(list: &ListResult) -> serde_json::Value {
    let rows: Vec<_> = list
        .iter()
        .map(|row| {
            let fields: serde_json::Map<String, serde_json::Value> = row
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect();
            json!({ "index": row.index, "key": row.key, "fields": fields })
        })
        .collect();
    json!({
        "rows": rows,
        "total_count": list.total_count,
        "end_of_list": list.end_of_list,
    })
}

fn print_list(list: &ListResult, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&list_to_json(list))?);
        return Ok(());
    }
    for row in list.iter() {
        let fields: Vec<String> = row
            .fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        match &row.key {
            Some(key) => println!("{:>4} [{}] {}", row.index, key, fields.join(" ")),
            None => println!("{:>4} {}", row.index, fields.join(" ")),
        }
    }
    if !list.end_of_list {
        println!("(more rows follow)");
    }
    Ok(())
}

fn print_status(radio: &Radio) -> Result<()> {
    println!("Name:    {}", radio.friendly_name()?);
    println!("Power:   {}", if radio.power()? { "on" } else { "off" });
    println!(
        "Mode:    {}",
        radio.mode()?.unwrap_or_else(|| "unknown".to_string())
    );
    println!("Status:  {}", radio.play_status()?);
    println!("Volume:  {} / {}", radio.volume()?, radio.volume_steps()?.saturating_sub(1));
    println!("Muted:   {}", if radio.mute()? { "yes" } else { "no" });

    let name = radio.play_info_name()?;
    if !name.is_empty() {
        println!("Playing: {}", name);
    }
    let text = radio.play_info_text()?;
    if !text.is_empty() {
        println!("         {}", text);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let client = args.connect()?;
    debug!(base_url = client.base_url(), "using FSAPI endpoint");

    match &args.command {
        Command::Get { node, kind } => {
            let (node_ref, catalog_kind) = resolve_node(node, NodeUse::Read)?;
            let value = match kind.or(catalog_kind) {
                Some(kind) => client.get_value_as(node_ref, kind),
                None => client.get_value(node_ref),
            }
            .with_context(|| format!("Failed to read {}", node))?;
            println!("{}", value);
        }
        Command::Set { node, kind, value } => {
            let (node_ref, _) = resolve_node(node, NodeUse::Write)?;
            let value = Value::parse_as(*kind, value)
                .with_context(|| format!("'{}' is not a valid {} value", value, kind))?;
            client
                .set_value(node_ref, value)
                .with_context(|| format!("Failed to write {}", node))?;
        }
        Command::List {
            node,
            offset,
            page_size,
            limit,
            json,
        } => {
            let (node_ref, _) = resolve_node(node, NodeUse::List)?;
            let mut query = ListQuery::new(*offset, page_size.unwrap_or(client.config().page_size));
            if let Some(limit) = limit {
                query = query.with_limit(*limit);
            }
            match client.get_list_with(node_ref, query) {
                Ok(list) => print_list(&list, *json)?,
                Err(ProtocolError::Interrupted { partial, source }) => {
                    print_list(&partial, *json)?;
                    return Err(anyhow!(*source))
                        .with_context(|| format!("List {} interrupted after {} rows", node, partial.len()));
                }
                Err(e) => return Err(e).with_context(|| format!("Failed to read list {}", node)),
            }
        }
        Command::Status => {
            let radio = Radio::new(client);
            print_status(&radio).context("Failed to read radio status")?;
        }
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    match level {
        Some(level) => logging::init_logging_with_filter(LoggingMode::Development, Some(level))?,
        None => logging::init_logging_from_env()?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_tracing(args.log_level.as_deref()).context("Failed to initialize logging")?;

    run(&args)
}

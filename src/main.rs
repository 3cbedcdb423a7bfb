use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use docker_facade::{
    exit_code_for_error, Config, Docker, DockerError, JsonObject, LogStream, RemoveOptions, StreamKind,
};

#[derive(Parser, Debug)]
#[command(name = "docker-facade", version, about = "Talk to a Docker daemon over its HTTP API.")]
struct Cli {
    /// Daemon address (unix:///path, tcp://host:port, https://host:port). Overrides DOCKER_HOST.
    #[arg(long, short = 'H')]
    host: Option<String>,

    /// Engine API version, e.g. 1.45. Overrides DOCKER_API_VERSION.
    #[arg(long)]
    api_version: Option<String>,

    /// Print the resolved configuration before running the command
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
enum Cmd {
    /// Check that the daemon answers /_ping
    Ping,
    /// Print daemon and client version information
    Version,
    /// Print daemon system information
    Info,
    /// List containers
    Ps {
        /// Include stopped containers
        #[arg(long, short)]
        all: bool,
    },
    /// List images
    Images,
    /// Print a container's inspect document
    Inspect { container: String },
    Start { container: String },
    Stop { container: String },
    Restart { container: String },
    Kill { container: String },
    Pause { container: String },
    Unpause { container: String },
    /// Rename a container
    Rename { container: String, name: String },
    /// Remove a container
    Rm {
        container: String,
        #[arg(long, short)]
        force: bool,
        /// Also remove anonymous volumes
        #[arg(long, short)]
        volumes: bool,
    },
    /// Block until a container stops; exits with its status code
    Wait {
        container: String,
        /// not-running, next-exit or removed
        #[arg(long)]
        condition: Option<String>,
    },
    /// Print a container's logs
    Logs {
        container: String,
        #[arg(long, short)]
        follow: bool,
        #[arg(long)]
        tail: Option<usize>,
    },
    /// List processes running in a container
    Top { container: String },
    /// Run a command in a running container and print its output
    Exec {
        container: String,
        #[arg(trailing_var_arg = true, required = true)]
        cmd: Vec<String>,
    },
    /// Create a container from an image and start it
    Run { image: String },
    /// Pull an image
    Pull {
        name: String,
        #[arg(default_value = "latest")]
        tag: String,
    },
    /// Tag an image as repo[:tag]
    Tag {
        image: String,
        repo: String,
        #[arg(default_value = "latest")]
        tag: String,
    },
    /// Remove an image
    Rmi { image: String },
    /// Show an image's layer history
    History { image: String },
}

fn connect(cli: &Cli) -> docker_facade::Result<Docker> {
    let mut cfg = Config::from_env()?;
    if let Some(h) = &cli.host {
        cfg.host = h.parse()?;
    }
    if let Some(v) = &cli.api_version {
        cfg.api_version = docker_facade::config::normalize_version(v)?;
    }
    if cli.verbose {
        eprintln!("docker-facade: host: {}", cfg.host);
        eprintln!("docker-facade: api version: {}", cfg.api_version);
        match cfg.timeout {
            Some(t) => eprintln!("docker-facade: timeout: {}s", t.as_secs()),
            None => eprintln!("docker-facade: timeout: none"),
        }
    }
    Docker::from_config(&cfg)
}

fn print_json(doc: &JsonObject) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(doc)?;
    println!("{text}");
    Ok(())
}

fn field<'a>(doc: &'a JsonObject, key: &str) -> &'a str {
    doc.get(key).and_then(Value::as_str).unwrap_or("")
}

fn short(id: &str) -> &str {
    let id = id.strip_prefix("sha256:").unwrap_or(id);
    match id.char_indices().nth(12) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Demultiplex a non-TTY output stream onto our stdout and stderr.
fn write_frames(stream: LogStream) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    for frame in stream.frames() {
        let frame = frame.context("reading container output")?;
        match frame.kind {
            StreamKind::Stderr => err.write_all(&frame.payload)?,
            _ => out.write_all(&frame.payload)?,
        }
    }
    out.flush()?;
    Ok(())
}

fn print_version(docker: &Docker) -> anyhow::Result<()> {
    println!("Client:");
    println!("  version: {}", env!("CARGO_PKG_VERSION"));
    println!("  api version: {}", docker.base().path().trim_start_matches("/v"));
    println!("  built: {}", env!("DOCKER_FACADE_BUILD_DATE"));
    println!(
        "  target: {} ({})",
        env!("DOCKER_FACADE_BUILD_TARGET"),
        env!("DOCKER_FACADE_BUILD_PROFILE")
    );
    let server = docker.version()?;
    println!("Server:");
    for key in ["Version", "ApiVersion", "MinAPIVersion", "Os", "Arch", "KernelVersion"] {
        if let Some(v) = server.get(key).and_then(Value::as_str) {
            println!("  {key}: {v}");
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let docker = connect(cli)?;
    let containers = docker.containers();
    let images = docker.images();

    match &cli.command {
        Cmd::Ping => {
            docker.ping()?;
            println!("OK");
        }
        Cmd::Version => print_version(&docker)?,
        Cmd::Info => print_json(&docker.info()?)?,
        Cmd::Ps { all } => {
            let list: Vec<_> = if *all {
                containers.list_all()?.collect()
            } else {
                containers.list()?.collect()
            };
            println!("{:<14}{:<32}{:<24}NAMES", "CONTAINER ID", "IMAGE", "STATUS");
            for c in list {
                let doc = c.identity();
                let names = doc
                    .get("Names")
                    .and_then(Value::as_array)
                    .map(|ns| {
                        ns.iter()
                            .filter_map(Value::as_str)
                            .map(|n| n.trim_start_matches('/'))
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .unwrap_or_default();
                println!(
                    "{:<14}{:<32}{:<24}{}",
                    short(c.id().unwrap_or("")),
                    field(doc, "Image"),
                    field(doc, "Status"),
                    names
                );
            }
        }
        Cmd::Images => {
            println!("{:<14}REPOSITORY:TAG", "IMAGE ID");
            for img in images.list()? {
                let tags = img
                    .identity()
                    .get("RepoTags")
                    .and_then(Value::as_array)
                    .map(|ts| ts.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                println!("{:<14}{}", short(img.id().unwrap_or("")), tags);
            }
        }
        Cmd::Inspect { container } => print_json(&containers.get(container).inspect()?)?,
        Cmd::Start { container } => containers.get(container).start()?,
        Cmd::Stop { container } => containers.get(container).stop()?,
        Cmd::Restart { container } => containers.get(container).restart()?,
        Cmd::Kill { container } => containers.get(container).kill()?,
        Cmd::Pause { container } => containers.get(container).pause()?,
        Cmd::Unpause { container } => containers.get(container).unpause()?,
        Cmd::Rename { container, name } => containers.get(container).rename(name)?,
        Cmd::Rm {
            container,
            force,
            volumes,
        } => containers.get(container).remove_with(RemoveOptions {
            volumes: *volumes,
            force: *force,
            link: false,
        })?,
        Cmd::Wait {
            container,
            condition,
        } => {
            let code = containers.get(container).wait(condition.as_deref())?;
            println!("{code}");
            return Ok(u8::try_from(code).unwrap_or(1));
        }
        Cmd::Logs {
            container,
            follow,
            tail,
        } => {
            let c = containers.get(container);
            // TTY containers log raw bytes; everything else is multiplexed.
            let tty = c
                .inspect()?
                .get("Config")
                .and_then(|cfg| cfg.get("Tty"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let mut logs = c.logs();
            if let Some(n) = tail {
                logs = logs.tail(*n);
            }
            let mut stream = if *follow { logs.follow()? } else { logs.stream()? };
            if tty {
                io::copy(&mut stream, &mut io::stdout().lock()).context("writing logs")?;
            } else {
                write_frames(stream)?;
            }
        }
        Cmd::Top { container } => print_json(&containers.get(container).top(None)?)?,
        Cmd::Exec { container, cmd } => {
            let exec = containers.get(container).exec(&json!({
                "Cmd": cmd,
                "AttachStdout": true,
                "AttachStderr": true,
                "Tty": false,
            }))?;
            write_frames(exec.start(false)?)?;
            let state = exec.inspect()?;
            let Some(code) = state.get("ExitCode").and_then(Value::as_i64) else {
                anyhow::bail!("exec {} finished without an ExitCode", exec.id().unwrap_or("?"));
            };
            return Ok(u8::try_from(code).unwrap_or(1));
        }
        Cmd::Run { image } => {
            let c = images.get(image).run()?;
            println!("{}", c.id().unwrap_or(""));
        }
        Cmd::Pull { name, tag } => {
            let img = images.pull(name, tag)?;
            println!("pulled {}", img.reference());
        }
        Cmd::Tag { image, repo, tag } => images.get(image).tag(repo, tag)?,
        Cmd::Rmi { image } => images.get(image).delete()?,
        Cmd::History { image } => {
            println!("{:<14}{:<12}CREATED BY", "IMAGE", "SIZE");
            for layer in images.get(image).history()? {
                let size = layer.get("Size").and_then(Value::as_i64).unwrap_or(0);
                println!(
                    "{:<14}{:<12}{}",
                    short(field(&layer, "Id")),
                    size,
                    field(&layer, "CreatedBy")
                );
            }
        }
    }
    Ok(0)
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    #[cfg(feature = "telemetry")]
    docker_facade::telemetry_init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("docker-facade: {e:#}");
            let code = e
                .downcast_ref::<DockerError>()
                .map(exit_code_for_error)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "action-gateway",
    version,
    about = "Expose function providers as HTTP actions with an OpenAPI description"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// trace, debug, info, warn, error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动 HTTP 服务
    Serve(ServeArgs),
    /// 输出 OpenAPI 文档
    Spec(SpecArgs),
    /// 列出 provider 的 action
    List(ListArgs),
    /// 初始化配置和 workspace
    Init(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// 配置文件路径，默认 ~/.action-gateway/config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    fn path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    fn load(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Config::load_default(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// 覆盖配置中的监听地址
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[derive(Args, Debug)]
pub struct SpecArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[arg(short, long)]
    pub identifier: Option<String>,

    /// 写入文件而不是 stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[arg(short, long)]
    pub identifier: Option<String>,
}

fn init_logging(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str =
            env::var("ACTION_GATEWAY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    let filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(format!(
            "action_gateway={level},tower_http={level},hyper=warn,reqwest=warn"
        )),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

async fn run_serve(args: &ServeArgs) -> Result<()> {
    let config = args.config.load()?;
    let bind_addr = args
        .bind
        .clone()
        .unwrap_or_else(|| config.server.bind_addr.clone());

    let state = AppState::from_config(&config)?;
    server::serve(state, &bind_addr).await
}

fn run_spec(args: &SpecArgs) -> Result<()> {
    let config = args.config.load()?;
    let state = AppState::from_config(&config)?;

    let document = state
        .dispatcher
        .describe(&state.serializer, args.identifier.as_deref())?;
    let json = serde_json::to_string_pretty(&document)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("✅ OpenAPI 文档已写入：{}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_list(args: &ListArgs) -> Result<()> {
    let config = args.config.load()?;
    let state = AppState::from_config(&config)?;

    let identifier = args
        .identifier
        .as_deref()
        .unwrap_or(state.serializer.identifier());
    let known = state.dispatcher.resolver().identifiers();
    println!("🔌 已注册的 identifier: {}", known.join(", "));
    println!();

    let provider = state.dispatcher.resolve_provider(Some(identifier))?;

    println!("📋 {} 的 action:", identifier);
    println!();
    for definition in provider.list_definitions() {
        let marker = if definition.parameters.is_some() { "" } else { " (无参数)" };
        println!("  {}{}", definition.name, marker);
        if !definition.description.is_empty() {
            println!("     {}", definition.description);
        }
    }
    Ok(())
}

fn run_init(args: &ConfigArgs) -> Result<()> {
    println!("🚀 初始化 action-gateway 配置...\n");

    let path = args.path();
    let config = if path.exists() {
        println!("ℹ️  配置文件已存在，保留现有内容：{}", path.display());
        Config::load(&path)?
    } else {
        let config = Config::default();
        config.save(&path).context("failed to save config file")?;
        println!("✅ 保存配置：{}", path.display());
        config
    };

    config.ensure_workspace()?;
    println!("✅ Workspace: {}", config.workspace.root.display());
    println!();
    println!("🎉 初始化完成！运行 'action-gateway serve' 启动服务");
    Ok(())
}

/// 主入口函数
pub async fn run_cli() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args);

    debug!("action-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match &args.command {
        Commands::Serve(serve_args) => run_serve(serve_args).await,
        Commands::Spec(spec_args) => run_spec(spec_args),
        Commands::List(list_args) => run_list(list_args),
        Commands::Init(init_args) => run_init(init_args),
    }
}

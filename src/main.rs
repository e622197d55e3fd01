use clap::{Parser, Subcommand};
use logene_voice_command_lib::config::{self, AppConfig};
use logene_voice_command_lib::{build_dispatcher, DispatchMode, Result, VoiceError};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "logene-voice-command")]
#[command(about = "Logene 语音指令 — 将识别文本分发到语音指令")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认在用户配置目录下）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 分发模式，覆盖配置文件
    #[arg(short, long, global = true, value_enum)]
    mode: Option<DispatchMode>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 从标准输入逐行读取识别文本并分发（默认）
    Listen,

    /// 列出匹配某段文本的指令，不执行
    Check {
        /// 识别文本
        text: String,
    },

    /// 写入默认配置文件
    Init {
        /// 覆盖已有配置
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config::config_path);

    match cli.command.unwrap_or(Commands::Listen) {
        Commands::Init { force } => {
            if path.exists() && !force {
                return Err(VoiceError::Config(format!(
                    "{} 已存在，使用 --force 覆盖",
                    path.display()
                )));
            }
            config::save_config(&path, &config::default_config())?;
            println!("已写入默认配置: {}", path.display());
            Ok(())
        }
        Commands::Check { text } => {
            let config = config::load_config_from(&path)?;
            check(&config, &text)
        }
        Commands::Listen => {
            let config = config::load_config_from(&path)?;
            listen(&config, cli.mode)
        }
    }
}

fn check(config: &AppConfig, text: &str) -> Result<()> {
    let root = config::build_commands(config)?;
    let labels: Vec<String> = config
        .commands
        .iter()
        .map(|c| c.label())
        .chain(config.voice_commands.keys().cloned())
        .collect();

    let matching = root.matching(text.trim());
    if matching.is_empty() {
        println!("无匹配指令");
    }
    for index in matching {
        let label = labels.get(index).map(String::as_str).unwrap_or("?");
        println!("#{} {label}", index + 1);
    }
    Ok(())
}

fn listen(config: &AppConfig, mode: Option<DispatchMode>) -> Result<()> {
    let (dispatcher, audio) = build_dispatcher(config, mode)?;
    log::info!(
        "已加载 {} 条指令，模式 {:?}，等待识别文本",
        dispatcher.commands().len(),
        dispatcher.mode()
    );

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if let Err(e) = dispatcher.dispatch(&line) {
            log::error!("分发 \"{}\" 失败: {e}", line.trim());
        }
    }

    // 输入结束后等待音频播放完
    if let Some(audio) = audio {
        while audio.is_playing() {
            std::thread::sleep(Duration::from_millis(50));
        }
    }
    Ok(())
}

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use name_guard_lib::{ConfigSource, NameGuard, NameGuardConfig, DEFAULT_SEPARATOR};

#[derive(Parser)]
#[command(name = "name-guard")]
#[command(about = "检测字幕中的中文人名并替换为占位符", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/NameGuard/name_guard.json，不存在时使用内置规则）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 替换人名。文本写到 stdout，占位符映射写到 stderr
    Protect {
        /// 输入文件（省略时读 stdin）
        file: Option<PathBuf>,
        /// cue 分隔符，空字符串表示整段文本为一个段落
        #[arg(long, default_value = DEFAULT_SEPARATOR)]
        separator: String,
        /// 输出 JSON（text / placeholders / names）
        #[arg(long)]
        json: bool,
    },

    /// 把内置默认规则写入配置文件
    InitConfig {
        /// 覆盖已存在的配置文件
        #[arg(long)]
        force: bool,
    },

    /// 查看单个词的判定详情（JSON）
    Explain {
        word: String,
        /// 统计出现次数所用的全文（默认为词本身）
        #[arg(long)]
        context: Option<String>,
        /// 按呼唤位判定
        #[arg(long)]
        call_position: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Protect {
            file,
            separator,
            json,
        } => {
            let guard = NameGuard::from_config(&load_config(cli.config.as_deref())?)?;
            let text = read_input(file.as_deref())?;
            let extraction = guard.extract_and_replace_names(&text, &separator);

            if json {
                println!("{}", serde_json::to_string_pretty(&extraction)?);
            } else {
                print!("{}", extraction.text);
                for (placeholder, name) in extraction.placeholders.iter() {
                    eprintln!("{}\t{}", placeholder, name);
                }
            }
            Ok(())
        }

        Command::InitConfig { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => NameGuardConfig::config_path()?,
            };
            if path.exists() && !force {
                anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
            }
            NameGuardConfig::builtin().save_to_path(&path)?;
            println!("已写入 {}", path.display());
            Ok(())
        }

        Command::Explain {
            word,
            context,
            call_position,
        } => {
            let guard = NameGuard::from_config(&load_config(cli.config.as_deref())?)?;
            let context = context.as_deref().unwrap_or(&word);
            let verdict = guard.evaluate_word(&word, context, call_position);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            Ok(())
        }
    }
}

/// 显式路径必须存在；否则按默认路径加载，缺失时回退内置规则
fn load_config(path: Option<&Path>) -> Result<NameGuardConfig> {
    if let Some(path) = path {
        return NameGuardConfig::load_from_path(path);
    }

    let (config, source) = NameGuardConfig::load()?;
    match source {
        ConfigSource::File(path) => tracing::debug!("使用配置文件: {}", path.display()),
        ConfigSource::Builtin => tracing::debug!("使用内置规则"),
    }
    Ok(config)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("读取输入文件失败 {}: {}", path.display(), e)),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

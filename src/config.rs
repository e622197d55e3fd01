use crate::action::ConfiguredAction;
use crate::command::Command;
use crate::dispatcher::DispatchMode;
use crate::error::{Result, VoiceError};
use crate::pattern::Pattern;
use crate::set::CommandSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// 语音指令 → 快捷键映射，如 "肉眼所见" = "ALT+R"
    #[serde(default)]
    pub voice_commands: BTreeMap<String, String>,
    /// 完整指令定义，先于 voice_commands 参与匹配
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// 是否播报应答
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// TTS 程序，文本作为最后一个参数；为空按平台选择
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// 是否播放音频
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 相对路径的音频文件以此目录为基准
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub mode: DispatchMode,
}

/// 单条指令
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// 有序词表，顺序很重要
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<String>,
    /// 指令短语
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// 自定义正则，设置后忽略 words 和 command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// 匹配后播报的应答
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// 匹配后播放的 WAV 文件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play: Option<PathBuf>,
    #[serde(default)]
    pub action: ConfiguredAction,
}

fn default_true() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: None,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            media_dir: None,
        }
    }
}

impl CommandConfig {
    fn pattern(&self) -> Result<Pattern> {
        match &self.regex {
            Some(raw) => Pattern::from_regex(raw),
            None => Pattern::new(self.words.iter().cloned(), self.command.clone()),
        }
    }

    /// 日志和 check 输出中显示的名称
    pub fn label(&self) -> String {
        if let Some(command) = &self.command {
            command.clone()
        } else if !self.words.is_empty() {
            self.words.join(" ")
        } else {
            self.regex.clone().unwrap_or_default()
        }
    }
}

/// 获取配置文件路径
pub fn config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logene-voice-command");
    config_dir.join("config.toml")
}

/// 加载默认位置的配置
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

/// 加载配置，文件不存在则创建默认配置
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let content = fs::read_to_string(path).map_err(|source| VoiceError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    } else {
        log::info!("配置文件不存在，创建默认配置: {}", path.display());
        let config = default_config();
        save_config(path, &config)?;
        Ok(config)
    }
}

/// 保存配置到文件
pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// 由配置构建指令集合：commands 在前，voice_commands 在后
pub fn build_commands(config: &AppConfig) -> Result<CommandSet> {
    let mut root = CommandSet::new("root");

    for (index, entry) in config.commands.iter().enumerate() {
        let pattern = entry.pattern()?;
        if pattern.as_str().is_none() {
            return Err(VoiceError::Config(format!(
                "第 {} 条指令缺少 words、command 或 regex",
                index + 1
            )));
        }

        let mut command = Command::new(pattern, entry.action.clone());
        command.set_answer(entry.answer.clone());
        command.set_media(entry.play.as_ref().map(|p| resolve_media(&config.player, p)));
        root.push(command);
    }

    for (phrase, shortcut) in &config.voice_commands {
        let action = ConfiguredAction::Shortcut {
            keys: shortcut.clone(),
        };
        root.push(Command::from_command(phrase.as_str(), action)?);
    }

    log::debug!("已加载 {} 条语音指令", root.len());
    Ok(root)
}

fn resolve_media(player: &PlayerConfig, path: &Path) -> PathBuf {
    match &player.media_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// 默认配置
pub fn default_config() -> AppConfig {
    let mut voice_commands = BTreeMap::new();
    voice_commands.insert("肉眼所见".to_string(), "ALT+R".to_string());
    voice_commands.insert("查询病人".to_string(), "ALT+Q".to_string());
    voice_commands.insert("上一个".to_string(), "ALT+A".to_string());
    voice_commands.insert("下一个".to_string(), "ALT+B".to_string());
    voice_commands.insert("病理号".to_string(), "F9".to_string());

    let commands = vec![
        CommandConfig {
            command: Some("保存报告".to_string()),
            answer: Some("已保存".to_string()),
            action: ConfiguredAction::Shortcut {
                keys: "F2".to_string(),
            },
            ..CommandConfig::default()
        },
        CommandConfig {
            words: vec!["增加".to_string(), "切片".to_string()],
            answer: Some("好的".to_string()),
            action: ConfiguredAction::Shortcut {
                keys: "F6".to_string(),
            },
            ..CommandConfig::default()
        },
        CommandConfig {
            command: Some("你好".to_string()),
            answer: Some("你好，请说出指令".to_string()),
            action: ConfiguredAction::None,
            ..CommandConfig::default()
        },
    ];

    AppConfig {
        speech: SpeechConfig::default(),
        player: PlayerConfig::default(),
        dispatch: DispatchConfig::default(),
        voice_commands,
        commands,
    }
}

use std::path::PathBuf;

/// 语音指令相关错误
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("读取配置 {path} 失败: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("解析配置失败: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("序列化配置失败: {0}")]
    SerializeConfig(#[from] toml::ser::Error),

    #[error("编译匹配规则失败: {0}")]
    Pattern(#[from] regex::Error),

    #[error("语音播报失败: {0}")]
    Speech(String),

    #[error("音频播放失败: {0}")]
    Playback(String),

    #[error("模拟输入失败: {0}")]
    Input(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VoiceError>;

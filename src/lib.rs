pub mod action;
pub mod audio;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod input_sim;
pub mod pattern;
pub mod set;
pub mod speech;

pub use action::{Action, ConfiguredAction};
pub use audio::{AudioPlayer, MediaPlayer, NullPlayer};
pub use command::{Command, Outputs};
pub use config::AppConfig;
pub use dispatcher::{DispatchMode, Dispatcher};
pub use error::{Result, VoiceError};
pub use pattern::Pattern;
pub use set::{CommandSet, Dispatch};
pub use speech::{SilentSpeaker, Speaker, SystemSpeaker};

use std::sync::Arc;

/// 按配置创建播报和播放器。播放器启动失败时降级为不播放
pub fn build_outputs(config: &AppConfig) -> (Outputs, Option<Arc<AudioPlayer>>) {
    let speaker: Arc<dyn Speaker> = if config.speech.enabled {
        Arc::new(SystemSpeaker::new(config.speech.program.clone()))
    } else {
        Arc::new(SilentSpeaker)
    };

    let audio = if config.player.enabled {
        match AudioPlayer::start() {
            Ok(player) => Some(Arc::new(player)),
            Err(e) => {
                log::error!("启动播放器失败: {e}，关闭音频播放");
                None
            }
        }
    } else {
        None
    };

    let player: Arc<dyn MediaPlayer> = match &audio {
        Some(player) => player.clone() as Arc<dyn MediaPlayer>,
        None => Arc::new(NullPlayer),
    };

    (Outputs::new(speaker, player), audio)
}

/// 由配置创建分发器，`mode` 覆盖配置中的分发模式
pub fn build_dispatcher(
    config: &AppConfig,
    mode: Option<DispatchMode>,
) -> Result<(Dispatcher, Option<Arc<AudioPlayer>>)> {
    let root = config::build_commands(config)?;
    let (outputs, audio) = build_outputs(config);
    let mode = mode.unwrap_or(config.dispatch.mode);
    Ok((Dispatcher::new(root, outputs, mode), audio))
}

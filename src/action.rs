use crate::error::VoiceError;
use crate::input_sim;
use serde::{Deserialize, Serialize};
use std::process::Command as Process;

/// 指令匹配后执行的动作，返回是否执行成功
pub trait Action: Send + Sync {
    fn perform(&self) -> bool;

    /// 日志里显示的动作描述
    fn describe(&self) -> String {
        "动作".to_string()
    }
}

impl<F> Action for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn perform(&self) -> bool {
        self()
    }

    fn describe(&self) -> String {
        "自定义动作".to_string()
    }
}

/// 配置文件中可声明的动作
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfiguredAction {
    /// 发送快捷键，如 "ALT+R"
    Shortcut { keys: String },
    /// 输入一段文本
    TypeText {
        text: String,
        #[serde(default)]
        use_clipboard: bool,
    },
    /// 启动外部程序，不等待退出（后台回收）
    Run {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// 什么也不做（只播报/播放的指令）
    #[default]
    None,
}

impl Action for ConfiguredAction {
    fn perform(&self) -> bool {
        let result = match self {
            ConfiguredAction::Shortcut { keys } => input_sim::send_shortcut(keys),
            ConfiguredAction::TypeText {
                text,
                use_clipboard,
            } => input_sim::type_text(text, *use_clipboard),
            ConfiguredAction::Run { program, args } => spawn_detached(program, args),
            ConfiguredAction::None => Ok(()),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("执行{}失败: {e}", self.describe());
                false
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredAction::Shortcut { keys } => format!("快捷键 {keys}"),
            ConfiguredAction::TypeText { text, .. } => format!("输入文本 \"{text}\""),
            ConfiguredAction::Run { program, .. } => format!("程序 {program}"),
            ConfiguredAction::None => "空动作".to_string(),
        }
    }
}

/// 启动程序后立即返回，由后台线程等待退出并回收子进程
fn spawn_detached(program: &str, args: &[String]) -> Result<(), VoiceError> {
    let mut child = Process::new(program).args(args).spawn()?;
    let program = program.to_string();
    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => log::warn!("程序 {program} 退出: {status}"),
        Ok(_) => {}
        Err(e) => log::error!("等待程序 {program} 退出失败: {e}"),
    });
    Ok(())
}

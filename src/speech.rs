use crate::error::{Result, VoiceError};
use std::process::Command;

/// 文本转语音
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<()>;
}

/// 调用系统 TTS 程序播报，播报结束后返回
pub struct SystemSpeaker {
    program: Option<String>,
}

impl SystemSpeaker {
    /// `program` 为空时按平台选择：macOS `say`，Windows PowerShell，其它 `espeak`
    pub fn new(program: Option<String>) -> Self {
        Self {
            program: program.filter(|p| !p.trim().is_empty()),
        }
    }

    fn command(&self, text: &str) -> Command {
        if let Some(program) = &self.program {
            let mut cmd = Command::new(program);
            cmd.arg(text);
            return cmd;
        }

        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("say");
            cmd.arg(text);
            cmd
        } else if cfg!(windows) {
            let script = format!(
                "Add-Type -AssemblyName System.Speech; \
                 (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
                text.replace('\'', "''")
            );
            let mut cmd = Command::new("powershell");
            cmd.args(["-NoProfile", "-Command", &script]);
            cmd
        } else {
            let mut cmd = Command::new("espeak");
            cmd.arg(text);
            cmd
        }
    }
}

impl Speaker for SystemSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        log::info!("播报: {text}");
        let status = self
            .command(text)
            .status()
            .map_err(|e| VoiceError::Speech(format!("启动 TTS 程序失败: {e}")))?;
        if !status.success() {
            return Err(VoiceError::Speech(format!("TTS 程序异常退出: {status}")));
        }
        Ok(())
    }
}

/// 关闭播报时使用
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        log::debug!("播报已关闭，跳过: {text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_program_receives_text() {
        let speaker = SystemSpeaker::new(Some("my-tts".to_string()));
        let cmd = speaker.command("你好");
        assert_eq!(cmd.get_program(), "my-tts");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["你好"]);
    }

    #[test]
    fn test_blank_program_uses_platform_default() {
        let speaker = SystemSpeaker::new(Some("  ".to_string()));
        assert!(speaker.program.is_none());
    }

    #[test]
    fn test_missing_program_is_a_speech_error() {
        let speaker = SystemSpeaker::new(Some("/definitely/not/a/tts".to_string()));
        assert!(matches!(speaker.speak("hi"), Err(VoiceError::Speech(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_speak_waits_for_tts_to_finish() {
        let speaker = SystemSpeaker::new(Some("true".to_string()));
        for _ in 0..5 {
            speaker.speak("hi").unwrap();
        }
        #[cfg(target_os = "linux")]
        assert_eq!(
            crate::command::testing::wait_no_zombies(std::time::Duration::from_secs(2)),
            0
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tts_is_a_speech_error() {
        let speaker = SystemSpeaker::new(Some("false".to_string()));
        assert!(matches!(speaker.speak("hi"), Err(VoiceError::Speech(_))));
    }

    #[test]
    fn test_silent_speaker() {
        assert!(SilentSpeaker.speak("OK").is_ok());
    }
}

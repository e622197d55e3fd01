//! 单条语音指令：匹配规则 + 动作 + 可选的语音应答和音频

use crate::action::Action;
use crate::audio::MediaPlayer;
use crate::error::Result;
use crate::pattern::Pattern;
use crate::speech::Speaker;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 指令执行时用到的外部输出：播报和播放器（全进程共用一个播放器）
#[derive(Clone)]
pub struct Outputs {
    pub speaker: Arc<dyn Speaker>,
    pub player: Arc<dyn MediaPlayer>,
}

impl Outputs {
    pub fn new(speaker: Arc<dyn Speaker>, player: Arc<dyn MediaPlayer>) -> Self {
        Self { speaker, player }
    }
}

/// 语音指令：匹配规则 + 动作，可选应答文本和音频文件
pub struct Command {
    pattern: Pattern,
    answer: Option<String>,
    media: Option<PathBuf>,
    action: Box<dyn Action>,
}

impl Command {
    /// 由已构建的匹配规则创建
    pub fn new(pattern: Pattern, action: impl Action + 'static) -> Self {
        Self {
            pattern,
            answer: None,
            media: None,
            action: Box::new(action),
        }
    }

    /// 词表顺序决定匹配规则
    pub fn from_words<I, S>(words: I, action: impl Action + 'static) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(Pattern::from_words(words)?, action))
    }

    /// 由指令短语创建
    pub fn from_command(command: impl Into<String>, action: impl Action + 'static) -> Result<Self> {
        Ok(Self::new(Pattern::from_command(command)?, action))
    }

    /// 词表用于匹配，指令短语保留给识别语法
    pub fn with_words_and_command<I, S>(
        words: I,
        command: impl Into<String>,
        action: impl Action + 'static,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(
            Pattern::new(words, Some(command.into()))?,
            action,
        ))
    }

    /// 设置匹配后播报的应答
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// 设置匹配后播放的音频文件
    pub fn with_media(mut self, media: impl Into<PathBuf>) -> Self {
        self.media = Some(media.into());
        self
    }

    /// 替换应答，None 表示不播报
    pub fn set_answer(&mut self, answer: Option<String>) {
        self.answer = answer;
    }

    /// 替换音频文件，None 表示不播放
    pub fn set_media(&mut self, media: Option<PathBuf>) {
        self.media = media;
    }

    /// 替换动作
    pub fn set_action(&mut self, action: impl Action + 'static) {
        self.action = Box::new(action);
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn media(&self) -> Option<&Path> {
        self.media.as_deref()
    }

    /// 识别文本是否匹配本指令
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.matches(text)
    }

    /// 匹配则依次：播报应答 → 播放音频 → 执行动作，返回动作结果。
    /// 不匹配返回 false 且没有任何副作用。动作失败不会撤销播报和播放。
    pub fn perform(&self, text: &str, outputs: &Outputs) -> Result<bool> {
        if !self.matches(text) {
            return Ok(false);
        }

        log::info!("指令匹配: {} → {}", text.trim(), self.action.describe());

        if let Some(answer) = &self.answer {
            outputs.speaker.speak(answer)?;
        }

        if self.media.is_some() {
            self.play(outputs)?;
        }

        Ok(self.action.perform())
    }

    /// 与 `perform` 相同。“只执行第一条匹配”的语义由 `CommandSet::perform_first` 提供
    pub fn perform_first(&self, text: &str, outputs: &Outputs) -> Result<bool> {
        self.perform(text, outputs)
    }

    /// 播放本指令的音频文件，未设置时什么也不做
    pub fn play(&self, outputs: &Outputs) -> Result<()> {
        match &self.media {
            Some(media) => outputs.player.play(media),
            None => Ok(()),
        }
    }

    /// 停止共用播放器
    pub fn stop(&self, outputs: &Outputs) -> Result<()> {
        outputs.player.stop()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern.as_str())
            .field("answer", &self.answer)
            .field("media", &self.media)
            .field("action", &self.action.describe())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Event, Recorder};
    use super::*;

    #[test]
    fn test_turn_on_the_light() {
        let rec = Recorder::default();
        let cmd = Command::from_command("turn on the light", rec.action("light_on", true))
            .unwrap()
            .with_answer("OK");
        let out = rec.outputs();

        assert!(cmd.perform("turn on the light", &out).unwrap());
        assert_eq!(
            rec.events(),
            vec![Event::Speak("OK".to_string()), Event::Action("light_on")]
        );

        assert!(!cmd.perform("turn off the light", &out).unwrap());
        assert_eq!(rec.events().len(), 2);
    }

    #[test]
    fn test_no_match_has_no_side_effects() {
        let rec = Recorder::default();
        let cmd = Command::from_words(["play", "music"], rec.action("music", true))
            .unwrap()
            .with_answer("好的")
            .with_media("song.wav");

        assert!(!cmd.perform("stop the music", &rec.outputs()).unwrap());
        assert!(!cmd.perform_first("stop the music", &rec.outputs()).unwrap());
        assert!(rec.events().is_empty());
    }

    #[test]
    fn test_side_effect_order() {
        let rec = Recorder::default();
        let cmd = Command::from_words(["play", "music"], rec.action("music", true))
            .unwrap()
            .with_answer("playing")
            .with_media("song.wav");

        assert!(cmd.perform("please play some music", &rec.outputs()).unwrap());
        assert_eq!(
            rec.events(),
            vec![
                Event::Speak("playing".to_string()),
                Event::Play(PathBuf::from("song.wav")),
                Event::Action("music"),
            ]
        );
    }

    #[test]
    fn test_unset_answer_and_media_skip_outputs() {
        let rec = Recorder::default();
        let cmd = Command::from_command("next", rec.action("next", true)).unwrap();

        assert!(cmd.perform("next", &rec.outputs()).unwrap());
        assert_eq!(rec.events(), vec![Event::Action("next")]);
    }

    #[test]
    fn test_action_failure_keeps_side_effects() {
        let rec = Recorder::default();
        let cmd = Command::from_command("save", rec.action("save", false))
            .unwrap()
            .with_answer("saving");

        assert!(!cmd.perform("save", &rec.outputs()).unwrap());
        assert_eq!(
            rec.events(),
            vec![Event::Speak("saving".to_string()), Event::Action("save")]
        );
    }

    #[test]
    fn test_speak_error_propagates_before_action() {
        let rec = Recorder {
            fail_speak: true,
            ..Recorder::default()
        };
        let cmd = Command::from_command("save", rec.action("save", true))
            .unwrap()
            .with_answer("saving");

        assert!(cmd.perform("save", &rec.outputs()).is_err());
        assert!(rec.events().is_empty());
    }

    #[test]
    fn test_perform_first_matches_perform() {
        let rec = Recorder::default();
        let cmd = Command::from_command("go", rec.action("go", true)).unwrap();
        let out = rec.outputs();

        assert_eq!(
            cmd.perform("go", &out).unwrap(),
            cmd.perform_first("go", &out).unwrap()
        );
        assert_eq!(rec.events(), vec![Event::Action("go"); 2]);
    }

    #[test]
    fn test_setters_replace_fields() {
        let rec = Recorder::default();
        let mut cmd = Command::from_command("hello", rec.action("old", true))
            .unwrap()
            .with_answer("hi");
        cmd.set_answer(None);
        cmd.set_media(Some(PathBuf::from("hello.wav")));
        cmd.set_action(rec.action("new", false));

        assert!(!cmd.perform("hello", &rec.outputs()).unwrap());
        assert_eq!(
            rec.events(),
            vec![Event::Play(PathBuf::from("hello.wav")), Event::Action("new")]
        );
    }

    #[test]
    fn test_play_and_stop() {
        let rec = Recorder::default();
        let out = rec.outputs();
        let silent = Command::from_command("a", || true).unwrap();
        silent.play(&out).unwrap();
        assert!(rec.events().is_empty());

        let cmd = silent.with_media("a.wav");
        cmd.play(&out).unwrap();
        cmd.stop(&out).unwrap();
        assert_eq!(
            rec.events(),
            vec![Event::Play(PathBuf::from("a.wav")), Event::Stop]
        );
    }
}

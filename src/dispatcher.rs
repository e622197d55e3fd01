use crate::command::Outputs;
use crate::error::Result;
use crate::set::{CommandSet, Dispatch};
use serde::{Deserialize, Serialize};

/// 分发模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// 只执行第一条匹配的指令
    #[default]
    First,
    /// 执行所有匹配的指令
    All,
}

/// 识别文本入口
pub struct Dispatcher {
    root: CommandSet,
    outputs: Outputs,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(root: CommandSet, outputs: Outputs, mode: DispatchMode) -> Self {
        Self {
            root,
            outputs,
            mode,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn commands(&self) -> &CommandSet {
        &self.root
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// 分发一条识别结果，空文本直接忽略
    pub fn dispatch(&self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }

        let performed = match self.mode {
            DispatchMode::First => self.root.perform_first(text, &self.outputs)?,
            DispatchMode::All => self.root.perform(text, &self.outputs)?,
        };

        if performed {
            log::info!("已执行: {text}");
        } else if self.root.matches(text) {
            log::warn!("指令匹配但执行失败: {text}");
        } else {
            log::info!("未匹配指令: {text}");
        }
        Ok(performed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::{Event, Recorder};
    use crate::command::Command;

    fn dispatcher(rec: &Recorder, mode: DispatchMode) -> Dispatcher {
        let root = CommandSet::new("root")
            .with(Command::from_words(["light"], rec.action("first", true)).unwrap())
            .with(Command::from_words(["light", "off"], rec.action("second", true)).unwrap());
        Dispatcher::new(root, rec.outputs(), mode)
    }

    #[test]
    fn test_first_mode() {
        let rec = Recorder::default();
        let d = dispatcher(&rec, DispatchMode::First);
        assert!(d.dispatch("light off").unwrap());
        assert_eq!(rec.events(), vec![Event::Action("first")]);
    }

    #[test]
    fn test_all_mode() {
        let rec = Recorder::default();
        let d = dispatcher(&rec, DispatchMode::All);
        assert!(d.dispatch("light off").unwrap());
        assert_eq!(
            rec.events(),
            vec![Event::Action("first"), Event::Action("second")]
        );
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let rec = Recorder::default();
        let d = dispatcher(&rec, DispatchMode::All);
        assert!(!d.dispatch("   ").unwrap());
        assert!(rec.events().is_empty());
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct W {
            mode: DispatchMode,
        }
        let w: W = toml::from_str("mode = \"all\"").unwrap();
        assert_eq!(w.mode, DispatchMode::All);
        assert_eq!(DispatchMode::default(), DispatchMode::First);
    }
}

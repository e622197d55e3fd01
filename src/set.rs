//! 指令集合：按顺序持有指令或子集合，支持“全部匹配执行”和“只执行第一条匹配”

use crate::command::{Command, Outputs};
use crate::error::Result;

/// 可分发识别文本的节点
pub trait Dispatch: Send + Sync {
    fn matches(&self, text: &str) -> bool;
    fn perform(&self, text: &str, outputs: &Outputs) -> Result<bool>;
    fn perform_first(&self, text: &str, outputs: &Outputs) -> Result<bool>;
}

impl Dispatch for Command {
    fn matches(&self, text: &str) -> bool {
        Command::matches(self, text)
    }

    fn perform(&self, text: &str, outputs: &Outputs) -> Result<bool> {
        Command::perform(self, text, outputs)
    }

    fn perform_first(&self, text: &str, outputs: &Outputs) -> Result<bool> {
        Command::perform_first(self, text, outputs)
    }
}

/// 有序的指令集合，子节点可以是指令或子集合
#[derive(Default)]
pub struct CommandSet {
    name: String,
    children: Vec<Box<dyn Dispatch>>,
}

impl CommandSet {
    /// 创建空集合，名称只用于日志
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 追加子节点，匹配顺序即追加顺序
    pub fn push(&mut self, child: impl Dispatch + 'static) {
        self.children.push(Box::new(child));
    }

    /// 追加子节点并返回自身，便于链式构建
    pub fn with(mut self, child: impl Dispatch + 'static) -> Self {
        self.push(child);
        self
    }

    /// 直接子节点数量
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// 匹配的直接子节点下标
    pub fn matching(&self, text: &str) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(text))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Dispatch for CommandSet {
    fn matches(&self, text: &str) -> bool {
        self.children.iter().any(|c| c.matches(text))
    }

    /// 按顺序执行所有匹配的子节点，任一成功即返回 true；出错立即中止
    fn perform(&self, text: &str, outputs: &Outputs) -> Result<bool> {
        let mut performed = false;
        for child in &self.children {
            if child.matches(text) && child.perform(text, outputs)? {
                performed = true;
            }
        }
        log::debug!("[{}] perform \"{}\" → {performed}", self.name, text);
        Ok(performed)
    }

    /// 只执行第一个匹配的子节点并返回其结果
    fn perform_first(&self, text: &str, outputs: &Outputs) -> Result<bool> {
        match self.children.iter().find(|c| c.matches(text)) {
            Some(child) => child.perform_first(text, outputs),
            None => {
                log::debug!("[{}] 无匹配: \"{}\"", self.name, text);
                Ok(false)
            }
        }
    }
}

//! 识别文本匹配规则
//!
//! 规则来源有两种：
//! - 有序词表：每个词按给定顺序出现即匹配，词之间可以夹杂其它内容。顺序很重要。
//! - 指令短语：trim、忽略大小写、合并空白、忽略句末标点后完全相等即匹配。
//!
//! 两者同时给出时，词表用于匹配，指令短语只作为语法短语保留。

use crate::error::Result;
use regex::Regex;

/// 句末可忽略的标点（ASR 常在结尾补标点）
const TRAILING_PUNCTUATION: &str = r"[\s.!?,。！？，、]*";

/// 匹配规则
#[derive(Debug, Clone)]
pub struct Pattern {
    words: Vec<String>,
    command: Option<String>,
    regex: Option<Regex>,
}

impl Pattern {
    /// 由词表和指令短语构建，词表优先
    pub fn new<I, S>(words: I, command: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w: &String| !w.trim().is_empty())
            .collect();
        let command = command.filter(|c| !c.trim().is_empty());

        let source = if !words.is_empty() {
            Some(words_regex(&words))
        } else {
            command.as_deref().map(command_regex)
        };
        let regex = source.map(|s| Regex::new(&s)).transpose()?;

        Ok(Self {
            words,
            command,
            regex,
        })
    }

    /// 由有序词表构建，顺序很重要
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words, None)
    }

    /// 由指令短语构建
    pub fn from_command(command: impl Into<String>) -> Result<Self> {
        Self::new(Vec::<String>::new(), Some(command.into()))
    }

    /// 直接使用正则表达式（配置文件中的 `regex` 字段）
    pub fn from_regex(raw: &str) -> Result<Self> {
        Ok(Self {
            words: Vec::new(),
            command: None,
            regex: Some(Regex::new(raw)?),
        })
    }

    /// 空规则，不匹配任何文本
    pub fn empty() -> Self {
        Self {
            words: Vec::new(),
            command: None,
            regex: None,
        }
    }

    /// 识别文本是否匹配
    pub fn matches(&self, text: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(text),
            None => false,
        }
    }

    /// 编译后的正则，空规则返回 None
    pub fn as_str(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// 提供给识别引擎语法的短语
    pub fn grammar_phrase(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::empty()
    }
}

/// 词内空白放宽为 `\s+`，其余字符按字面匹配
fn literal(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// 不属于 ASCII 字母数字的字符。regex 的 `\b` 把中文也当作单词字符，这里只按 ASCII 判断
const NON_ALNUM: &str = "[^A-Za-z0-9]";

/// 词首、词尾是否为 ASCII 字母数字
fn ascii_edges(word: &str) -> (bool, bool) {
    let starts = word.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends = word.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    (starts, ends)
}

/// ASCII 字母数字开头/结尾的词要求相邻字符不是 ASCII 字母数字；
/// 中文词及紧贴中文的英文词按子串匹配（“打开TV”）
fn words_regex(words: &[String]) -> String {
    let mut body = String::new();
    let mut prev_ends = false;

    for (index, word) in words.iter().enumerate() {
        let word = word.trim();
        let (starts, ends) = ascii_edges(word);
        // 词间间隔：前词尾需要边界则间隔以非字母数字开头，本词首需要边界则以其结尾
        let gap = match (index == 0, prev_ends, starts) {
            (true, _, true) => format!("(?:^|{NON_ALNUM})"),
            (true, _, false) => String::new(),
            (false, true, true) => format!("{NON_ALNUM}(?:.*?{NON_ALNUM})?"),
            (false, true, false) => format!("(?:{NON_ALNUM}.*?)?"),
            (false, false, true) => format!("(?:.*?{NON_ALNUM})?"),
            (false, false, false) => ".*?".to_string(),
        };
        body.push_str(&gap);
        body.push_str(&literal(word));
        prev_ends = ends;
    }

    if prev_ends {
        body.push_str(&format!("(?:{NON_ALNUM}|$)"));
    }
    format!("(?is){body}")
}

fn command_regex(command: &str) -> String {
    format!(r"(?i)^\s*{}{TRAILING_PUNCTUATION}$", literal(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_phrase_exact() {
        let p = Pattern::from_command("turn on the light").unwrap();
        assert!(p.matches("turn on the light"));
        assert!(p.matches("  Turn  on the LIGHT. "));
        assert!(!p.matches("turn off the light"));
        assert!(!p.matches("please turn on the light"));
    }

    #[test]
    fn test_command_phrase_chinese_punctuation() {
        let p = Pattern::from_command("保存报告").unwrap();
        assert!(p.matches("保存报告"));
        assert!(p.matches("保存报告。"));
        assert!(!p.matches("保存报告吧"));
    }

    #[test]
    fn test_words_in_order() {
        let p = Pattern::from_words(["turn", "light", "on"]).unwrap();
        assert!(p.matches("turn the light on"));
        assert!(p.matches("could you turn the kitchen light on please"));
        assert!(!p.matches("turn on the light"));
    }

    #[test]
    fn test_word_order_changes_pattern() {
        let a = Pattern::from_words(["light", "on"]).unwrap();
        let b = Pattern::from_words(["on", "light"]).unwrap();
        assert_ne!(a.as_str(), b.as_str());
        assert!(a.matches("light on"));
        assert!(!b.matches("light on"));
        assert!(b.matches("on light"));
        assert!(!a.matches("on light"));
    }

    #[test]
    fn test_words_respect_word_boundaries() {
        let p = Pattern::from_words(["on"]).unwrap();
        assert!(p.matches("switch on"));
        assert!(!p.matches("phone"));
    }

    #[test]
    fn test_chinese_words_match_as_substrings() {
        let p = Pattern::from_words(["打开", "灯"]).unwrap();
        assert!(p.matches("请打开客厅的灯"));
        assert!(!p.matches("灯打开"));
    }

    #[test]
    fn test_ascii_word_next_to_chinese() {
        let p = Pattern::from_words(["打开", "TV"]).unwrap();
        assert!(p.matches("打开TV"));
        assert!(p.matches("打开 TV"));
        assert!(p.matches("请打开客厅的tv。"));
        assert!(!p.matches("打开TVB"));

        let p = Pattern::from_words(["TV", "关掉"]).unwrap();
        assert!(p.matches("把TV关掉"));
        assert!(!p.matches("ATV关掉"));
    }

    #[test]
    fn test_adjacent_ascii_words_need_a_separator() {
        let p = Pattern::from_words(["on", "light"]).unwrap();
        assert!(p.matches("on light"));
        assert!(p.matches("on,light"));
        assert!(!p.matches("onlight"));
        assert!(!p.matches("on lights"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = Pattern::from_command("what is 1+1?").unwrap();
        assert!(p.matches("what is 1+1?"));
        assert!(!p.matches("what is 11"));
    }

    #[test]
    fn test_words_take_precedence_over_command() {
        let p = Pattern::new(["weather"], Some("what's the weather".to_string())).unwrap();
        assert_eq!(p.grammar_phrase(), Some("what's the weather"));
        assert!(p.matches("tell me the weather today"));
    }

    #[test]
    fn test_empty_words_fall_back_to_command() {
        let p = Pattern::new(["", "  "], Some("stop music".to_string())).unwrap();
        assert!(p.words().is_empty());
        assert!(p.matches("stop music"));
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let p = Pattern::default();
        assert!(p.as_str().is_none());
        assert!(!p.matches(""));
        assert!(!p.matches("anything"));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(Pattern::from_regex("(unclosed").is_err());
        let p = Pattern::from_regex(r"^play (track|song) \d+$").unwrap();
        assert!(p.matches("play track 7"));
    }
}

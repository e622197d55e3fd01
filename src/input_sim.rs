use crate::error::{Result, VoiceError};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};

fn input_err(what: &str) -> impl Fn(enigo::InputError) -> VoiceError + '_ {
    move |e| VoiceError::Input(format!("{what}: {e}"))
}

fn new_enigo() -> Result<Enigo> {
    Enigo::new(&Settings::default()).map_err(|e| VoiceError::Input(format!("初始化 enigo 失败: {e}")))
}

/// 模拟键盘输入文本
pub fn type_text(text: &str, use_clipboard: bool) -> Result<()> {
    if use_clipboard {
        type_via_clipboard(text)
    } else {
        type_via_keyboard(text)
    }
}

/// 通过键盘直接输入（enigo SendInput）
fn type_via_keyboard(text: &str) -> Result<()> {
    let mut enigo = new_enigo()?;
    enigo.text(text).map_err(input_err("输入文本失败"))
}

/// 通过剪贴板 + Ctrl+V 输入
fn type_via_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| VoiceError::Input(format!("打开剪贴板失败: {e}")))?;
    clipboard
        .set_text(text)
        .map_err(|e| VoiceError::Input(format!("写入剪贴板失败: {e}")))?;

    // 短暂延迟确保剪贴板就绪
    std::thread::sleep(std::time::Duration::from_millis(50));

    let mut enigo = new_enigo()?;
    enigo
        .key(Key::Control, Direction::Press)
        .map_err(input_err("按键失败"))?;
    enigo
        .key(Key::Unicode('v'), Direction::Click)
        .map_err(input_err("按键失败"))?;
    enigo
        .key(Key::Control, Direction::Release)
        .map_err(input_err("按键失败"))?;

    Ok(())
}

/// 模拟组合键，如 "ALT+R"、"CTRL+SHIFT+S"、"F2"
pub fn send_shortcut(shortcut: &str) -> Result<()> {
    // 先解析，避免无效快捷键时初始化输入设备
    let keys = parse_shortcut(shortcut)?;
    let mut enigo = new_enigo()?;

    for key in &keys {
        enigo
            .key(*key, Direction::Press)
            .map_err(|e| VoiceError::Input(format!("按下 {shortcut} 失败: {e}")))?;
    }

    // 逆序释放
    for key in keys.iter().rev() {
        enigo
            .key(*key, Direction::Release)
            .map_err(|e| VoiceError::Input(format!("释放 {shortcut} 失败: {e}")))?;
    }

    Ok(())
}

/// 解析快捷键字符串为 enigo Key 列表
pub fn parse_shortcut(shortcut: &str) -> Result<Vec<Key>> {
    if shortcut.trim().is_empty() {
        return Err(VoiceError::Input("快捷键为空".to_string()));
    }
    shortcut
        .split('+')
        .map(|part| parse_key(part.trim()))
        .collect()
}

fn parse_key(name: &str) -> Result<Key> {
    let key = match name.to_uppercase().as_str() {
        "CTRL" | "CONTROL" => Key::Control,
        "ALT" => Key::Alt,
        "SHIFT" => Key::Shift,
        "META" | "WIN" | "SUPER" | "CMD" => Key::Meta,
        "TAB" => Key::Tab,
        "ENTER" | "RETURN" => Key::Return,
        "ESCAPE" | "ESC" => Key::Escape,
        "SPACE" => Key::Space,
        "BACKSPACE" => Key::Backspace,
        "DELETE" | "DEL" => Key::Delete,
        "UP" => Key::UpArrow,
        "DOWN" => Key::DownArrow,
        "LEFT" => Key::LeftArrow,
        "RIGHT" => Key::RightArrow,
        "HOME" => Key::Home,
        "END" => Key::End,
        "PAGEUP" => Key::PageUp,
        "PAGEDOWN" => Key::PageDown,
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c.to_ascii_lowercase()),
                _ => return Err(VoiceError::Input(format!("未知按键: {name}"))),
            }
        }
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifier_combo() {
        let keys = parse_shortcut("ALT+R").unwrap();
        assert_eq!(keys, vec![Key::Alt, Key::Unicode('r')]);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        let keys = parse_shortcut("ctrl + Shift + s").unwrap();
        assert_eq!(keys, vec![Key::Control, Key::Shift, Key::Unicode('s')]);
    }

    #[test]
    fn test_parse_function_key() {
        assert_eq!(parse_shortcut("F9").unwrap(), vec![Key::F9]);
    }

    #[test]
    fn test_parse_unknown_key() {
        assert!(parse_shortcut("ALT+HYPER").is_err());
        assert!(parse_shortcut("").is_err());
        assert!(parse_shortcut("CTRL+").is_err());
    }
}

//! Binary VDF parser for per-user `shortcuts.vdf` stores.

use std::fs;
use std::path::Path;

use crc32fast::Hasher;

use crate::ClientError;

/// Binary VDF type markers.
const VDF_TYPE_OBJECT: u8 = 0x00;
const VDF_TYPE_STRING: u8 = 0x01;
const VDF_TYPE_INT32: u8 = 0x02;
const VDF_TYPE_END: u8 = 0x08;

/// A non-Steam game registered as a shortcut.
///
/// The app id is a valid icon-resolver key, exactly like a real
/// game's.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub app_id: u32,
    pub name: String,
    pub exe: String,
    pub start_dir: String,
    /// User-assigned icon path; often empty.
    pub icon: String,
}

/// Parses a binary `shortcuts.vdf` file.
pub fn load_shortcuts(path: &Path) -> Result<Vec<Shortcut>, ClientError> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ClientError::NotFound(path.to_path_buf())
        } else {
            ClientError::Io(e)
        }
    })?;
    parse_shortcuts(&data)
}

/// Parses binary shortcuts data.
pub fn parse_shortcuts(data: &[u8]) -> Result<Vec<Shortcut>, ClientError> {
    if data.len() < 3 {
        return Err(ClientError::Parse("shortcuts file too small".into()));
    }

    let mut pos = 0;

    if data[pos] != VDF_TYPE_OBJECT {
        return Err(ClientError::Parse(format!(
            "expected object marker at start, got 0x{:02x}",
            data[pos]
        )));
    }
    pos += 1;

    let (root, new_pos) = read_string(data, pos)?;
    pos = new_pos;

    if !root.eq_ignore_ascii_case("shortcuts") {
        return Err(ClientError::Parse(format!(
            "expected root key 'shortcuts', got '{root}'"
        )));
    }

    let mut shortcuts = Vec::new();

    while pos < data.len() {
        if data[pos] == VDF_TYPE_END {
            break;
        }

        if data[pos] != VDF_TYPE_OBJECT {
            return Err(ClientError::Parse(format!(
                "expected object marker for shortcut at pos {pos}, got 0x{:02x}",
                data[pos]
            )));
        }
        pos += 1;

        // Skip the index key ("0", "1", ...).
        let (_, new_pos) = read_string(data, pos)?;
        pos = new_pos;

        let (shortcut, new_pos) = parse_entry(data, pos)?;
        pos = new_pos;

        shortcuts.push(shortcut);
    }

    Ok(shortcuts)
}

/// Parses one shortcut entry.
///
/// Key casing varies between client versions, so keys are matched
/// case-insensitively. Entries written before Steam stored an `appid`
/// get the legacy CRC-derived id.
fn parse_entry(data: &[u8], mut pos: usize) -> Result<(Shortcut, usize), ClientError> {
    let mut shortcut = Shortcut {
        app_id: 0,
        name: String::new(),
        exe: String::new(),
        start_dir: String::new(),
        icon: String::new(),
    };

    while pos < data.len() {
        if data[pos] == VDF_TYPE_END {
            pos += 1;
            if shortcut.app_id == 0 {
                shortcut.app_id = generate_app_id(&shortcut.exe, &shortcut.name);
            }
            return Ok((shortcut, pos));
        }

        let type_byte = data[pos];
        pos += 1;

        let (key, new_pos) = read_string(data, pos)?;
        pos = new_pos;

        match type_byte {
            VDF_TYPE_STRING => {
                let (value, new_pos) = read_string(data, pos)?;
                pos = new_pos;

                match key.to_ascii_lowercase().as_str() {
                    "appname" => shortcut.name = value,
                    "exe" => shortcut.exe = value,
                    "startdir" => shortcut.start_dir = value,
                    "icon" => shortcut.icon = value,
                    _ => {}
                }
            }
            VDF_TYPE_INT32 => {
                if pos + 4 > data.len() {
                    return Err(ClientError::Parse(format!(
                        "unexpected end of data reading int32 for '{key}'"
                    )));
                }
                let value =
                    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
                pos += 4;

                if key.eq_ignore_ascii_case("appid") {
                    shortcut.app_id = value;
                }
            }
            VDF_TYPE_OBJECT => {
                // tags, and whatever else Steam nests here
                pos = skip_object(data, pos)?;
            }
            _ => {
                return Err(ClientError::Parse(format!(
                    "unknown type marker 0x{type_byte:02x} for key '{key}' at pos {pos}"
                )));
            }
        }
    }

    Err(ClientError::Parse(
        "unexpected end of data in shortcut entry".into(),
    ))
}

/// Skips an entire nested object.
fn skip_object(data: &[u8], mut pos: usize) -> Result<usize, ClientError> {
    while pos < data.len() {
        if data[pos] == VDF_TYPE_END {
            return Ok(pos + 1);
        }

        let type_byte = data[pos];
        pos += 1;

        let (_, new_pos) = read_string(data, pos)?;
        pos = new_pos;

        match type_byte {
            VDF_TYPE_STRING => {
                let (_, new_pos) = read_string(data, pos)?;
                pos = new_pos;
            }
            VDF_TYPE_INT32 => {
                if pos + 4 > data.len() {
                    return Err(ClientError::Parse("unexpected end of data".into()));
                }
                pos += 4;
            }
            VDF_TYPE_OBJECT => {
                pos = skip_object(data, pos)?;
            }
            _ => {
                return Err(ClientError::Parse(format!(
                    "unknown type 0x{type_byte:02x} while skipping"
                )));
            }
        }
    }

    Err(ClientError::Parse(
        "unexpected end of data while skipping object".into(),
    ))
}

/// Reads a null-terminated string.
fn read_string(data: &[u8], pos: usize) -> Result<(String, usize), ClientError> {
    let start = pos;
    let mut i = pos;
    while i < data.len() {
        if data[i] == 0x00 {
            let s = String::from_utf8_lossy(&data[start..i]).into_owned();
            return Ok((s, i + 1));
        }
        i += 1;
    }
    Err(ClientError::Parse(format!(
        "unterminated string starting at pos {start}"
    )))
}

/// Generates a legacy shortcut app id from executable path and name.
///
/// Matches Steam's algorithm: `CRC32(exe + name) | 0x80000000 | 0x02000000`.
pub fn generate_app_id(exe: &str, name: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(exe.as_bytes());
    hasher.update(name.as_bytes());
    (hasher.finalize() | 0x80000000) | 0x02000000
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestShortcut<'a> {
        name: &'a str,
        exe: &'a str,
        start_dir: &'a str,
        icon: &'a str,
        app_id: Option<u32>,
    }

    /// Builds a minimal valid shortcuts.vdf binary.
    fn build_vdf(shortcuts: &[TestShortcut]) -> Vec<u8> {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");

        for (i, sc) in shortcuts.iter().enumerate() {
            data.push(VDF_TYPE_OBJECT);
            data.extend_from_slice(i.to_string().as_bytes());
            data.push(0x00);

            if let Some(app_id) = sc.app_id {
                data.push(VDF_TYPE_INT32);
                data.extend_from_slice(b"appid\x00");
                data.extend_from_slice(&app_id.to_le_bytes());
            }

            for (key, value) in [
                ("AppName", sc.name),
                ("Exe", sc.exe),
                ("StartDir", sc.start_dir),
                ("icon", sc.icon),
            ] {
                data.push(VDF_TYPE_STRING);
                data.extend_from_slice(key.as_bytes());
                data.push(0x00);
                data.extend_from_slice(value.as_bytes());
                data.push(0x00);
            }

            data.push(VDF_TYPE_END);
        }

        data.push(VDF_TYPE_END);
        data
    }

    #[test]
    fn parse_empty() {
        let shortcuts = parse_shortcuts(&build_vdf(&[])).unwrap();
        assert!(shortcuts.is_empty());
    }

    #[test]
    fn parse_single_entry() {
        let data = build_vdf(&[TestShortcut {
            name: "Test Game",
            exe: "/usr/bin/game",
            start_dir: "/home/user",
            icon: "/home/user/game.png",
            app_id: Some(12345),
        }]);
        let shortcuts = parse_shortcuts(&data).unwrap();

        assert_eq!(shortcuts.len(), 1);
        assert_eq!(shortcuts[0].app_id, 12345);
        assert_eq!(shortcuts[0].name, "Test Game");
        assert_eq!(shortcuts[0].exe, "/usr/bin/game");
        assert_eq!(shortcuts[0].start_dir, "/home/user");
        assert_eq!(shortcuts[0].icon, "/home/user/game.png");
    }

    #[test]
    fn missing_appid_gets_legacy_id() {
        let data = build_vdf(&[TestShortcut {
            name: "Old Game",
            exe: "/bin/old",
            start_dir: "/home",
            icon: "",
            app_id: None,
        }]);
        let shortcuts = parse_shortcuts(&data).unwrap();

        assert_eq!(shortcuts[0].app_id, generate_app_id("/bin/old", "Old Game"));
        assert_ne!(shortcuts[0].app_id, 0);
    }

    #[test]
    fn parse_multiple_entries() {
        let data = build_vdf(&[
            TestShortcut { name: "A", exe: "/bin/a", start_dir: "/", icon: "", app_id: Some(100) },
            TestShortcut { name: "B", exe: "/bin/b", start_dir: "/", icon: "", app_id: Some(200) },
            TestShortcut { name: "C", exe: "/bin/c", start_dir: "/", icon: "", app_id: Some(300) },
        ]);
        let shortcuts = parse_shortcuts(&data).unwrap();

        assert_eq!(shortcuts.len(), 3);
        assert_eq!(shortcuts[0].name, "A");
        assert_eq!(shortcuts[2].app_id, 300);
    }

    #[test]
    fn nested_tags_object_is_skipped() {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");

        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"0\x00");

        data.push(VDF_TYPE_INT32);
        data.extend_from_slice(b"appid\x00");
        data.extend_from_slice(&42u32.to_le_bytes());

        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"AppName\x00Tagged\x00");

        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"tags\x00");
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"0\x00favorite\x00");
        data.push(VDF_TYPE_END);

        data.push(VDF_TYPE_END);
        data.push(VDF_TYPE_END);

        let shortcuts = parse_shortcuts(&data).unwrap();
        assert_eq!(shortcuts.len(), 1);
        assert_eq!(shortcuts[0].app_id, 42);
        assert_eq!(shortcuts[0].name, "Tagged");
    }

    #[test]
    fn lowercase_keys_are_accepted() {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"0\x00");
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"appname\x00lower\x00");
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"exe\x00/bin/x\x00");
        data.push(VDF_TYPE_END);
        data.push(VDF_TYPE_END);

        let shortcuts = parse_shortcuts(&data).unwrap();
        assert_eq!(shortcuts[0].name, "lower");
        assert_eq!(shortcuts[0].exe, "/bin/x");
    }

    #[test]
    fn reject_too_small() {
        assert!(parse_shortcuts(&[0x00, 0x00]).is_err());
    }

    #[test]
    fn reject_wrong_root_key() {
        let mut data = vec![VDF_TYPE_OBJECT];
        data.extend_from_slice(b"wrong\x00");
        data.push(VDF_TYPE_END);
        assert!(parse_shortcuts(&data).is_err());
    }

    #[test]
    fn reject_truncated_entry() {
        let mut data = Vec::new();
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"shortcuts\x00");
        data.push(VDF_TYPE_OBJECT);
        data.extend_from_slice(b"0\x00");
        data.push(VDF_TYPE_STRING);
        data.extend_from_slice(b"AppName\x00trunc"); // no terminator, no end markers
        assert!(parse_shortcuts(&data).is_err());
    }

    #[test]
    fn generate_app_id_matches_steam_mask() {
        let id = generate_app_id("/bin/test", "Test");
        assert_ne!(id & 0x80000000, 0);
        assert_ne!(id & 0x02000000, 0);
        assert_eq!(id, generate_app_id("/bin/test", "Test"));
        assert_ne!(id, generate_app_id("/bin/other", "Test"));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = load_shortcuts(Path::new("/nonexistent/shortcuts.vdf")).unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}

//! Login users from `config/loginusers.vdf`.

use std::path::PathBuf;

use tracing::warn;

use crate::shortcuts::{self, Shortcut};
use crate::vdf::{Document, Value};
use crate::{ClientError, Installation};

/// Offset between a steamID64 and the 32-bit account id used for
/// `userdata/` directory names.
const STEAM64_BASE: u64 = 76561197960265728;

/// One account that has logged in on this machine.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginUser {
    /// steamID64, as keyed in `loginusers.vdf`.
    pub id: String,
    pub account_name: String,
    pub persona_name: String,
    pub most_recent: bool,
    steam_root: PathBuf,
}

/// All login users, in file order.
#[derive(Debug, Clone, Default)]
pub struct LoginUsers(Vec<LoginUser>);

impl Installation {
    /// Parses `config/loginusers.vdf`.
    ///
    /// Steam writes the most-recent flag as `MostRecent` or, in some
    /// client versions, all-lowercase `mostrecent`; both are accepted.
    pub fn login_users(&self) -> Result<LoginUsers, ClientError> {
        let path = self.loginusers_path();
        let doc = Document::load(&path)?;
        let table = doc.get_table("users").ok_or_else(|| {
            ClientError::Parse(format!("no users key in {}", path.display()))
        })?;

        let mut users = Vec::new();
        for (id, value) in table.iter() {
            let Some(fields) = value.as_table() else {
                warn!(id, "login user entry is not a table, skipped");
                continue;
            };
            let most_recent = fields
                .get_ignore_case("MostRecent")
                .and_then(Value::as_str)
                == Some("1");
            users.push(LoginUser {
                id: id.to_owned(),
                account_name: fields.get_str("AccountName").unwrap_or_default().to_owned(),
                persona_name: fields.get_str("PersonaName").unwrap_or_default().to_owned(),
                most_recent,
                steam_root: self.root().to_path_buf(),
            });
        }

        Ok(LoginUsers(users))
    }
}

impl LoginUser {
    /// The 32-bit account id used under `userdata/`.
    ///
    /// `loginusers.vdf` keys are steamID64; the userdata directory is
    /// named after the low 32 bits. Ids that don't look like a
    /// steamID64 are used as-is.
    pub fn account_id(&self) -> String {
        match self.id.parse::<u64>() {
            Ok(id64) if id64 >= STEAM64_BASE => (id64 - STEAM64_BASE).to_string(),
            _ => self.id.clone(),
        }
    }

    /// Reads this user's non-Steam shortcuts.
    ///
    /// A user without a shortcuts store simply has no shortcuts; only
    /// a present-but-corrupt file is an error.
    pub fn shortcuts(&self) -> Result<Vec<Shortcut>, ClientError> {
        let path = self
            .steam_root
            .join("userdata")
            .join(self.account_id())
            .join("config")
            .join("shortcuts.vdf");
        if !path.is_file() {
            return Ok(Vec::new());
        }
        shortcuts::load_shortcuts(&path)
    }
}

impl LoginUsers {
    /// The user flagged most-recent, or the first in file order.
    pub fn most_recent(&self) -> Option<&LoginUser> {
        self.0
            .iter()
            .find(|user| user.most_recent)
            .or_else(|| self.0.first())
    }

    /// Looks a user up by account name.
    pub fn find(&self, account_name: &str) -> Option<&LoginUser> {
        self.0.iter().find(|user| user.account_name == account_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoginUser> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for LoginUsers {
    type Item = LoginUser;
    type IntoIter = std::vec::IntoIter<LoginUser>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LoginUsers {
    type Item = &'a LoginUser;
    type IntoIter = std::slice::Iter<'a, LoginUser>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

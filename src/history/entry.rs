// ABOUTME: Chat entry types — the closed role enum and the append-only history sequence.
// ABOUTME: Role labels only matter at the persistence boundary; in memory roles are variants.

/// Who produced a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    /// Label written to persisted storage for this role.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User:",
            Role::Assistant => "Bot:",
            Role::Error => "Error",
        }
    }

    /// Parse a persisted role label.
    ///
    /// Accepts the labels this crate writes as well as the bare and
    /// colon-suffixed spellings found in older stored histories.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().trim_end_matches(':') {
            "User" => Some(Role::User),
            "Bot" | "Assistant" => Some(Role::Assistant),
            "Error" => Some(Role::Error),
            _ => None,
        }
    }
}

/// One recorded chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    role: Role,
    text: String,
}

impl ChatEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Error, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered sequence of chat entries. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Append an entry and return its index.
    pub(crate) fn push(&mut self, entry: ChatEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }
}

impl FromIterator<ChatEntry> for ChatHistory {
    fn from_iter<I: IntoIterator<Item = ChatEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a ChatEntry;
    type IntoIter = std::slice::Iter<'a, ChatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back_to_the_same_role() {
        for role in [Role::User, Role::Assistant, Role::Error] {
            assert_eq!(Role::from_label(role.label()), Some(role));
        }
    }

    #[test]
    fn legacy_label_spellings_are_accepted() {
        assert_eq!(Role::from_label("User"), Some(Role::User));
        assert_eq!(Role::from_label("Bot"), Some(Role::Assistant));
        assert_eq!(Role::from_label("Error:"), Some(Role::Error));
        assert_eq!(Role::from_label("garbage"), None);
        assert_eq!(Role::from_label(""), None);
    }

    #[test]
    fn push_returns_index_of_new_entry() {
        let mut history = ChatHistory::new();
        assert_eq!(history.push(ChatEntry::user("a")), 0);
        assert_eq!(history.push(ChatEntry::assistant("b")), 1);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(ChatEntry::text), Some("b"));
    }
}

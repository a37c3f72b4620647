//! Entry path classification.
//!
//! Exports lay conversations out as
//! `.../<root>/<folder_key>/message_<N>.json`, where `<root>` is `inbox` for
//! regular chats. Anything else in the archive (media, settings, other
//! activity) is not part of the conversation namespace and classifies as
//! `None`.

/// Classification of one message file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryClass {
    /// The conversation folder the file belongs to.
    pub folder_key: String,
    /// Page number from a `message_<N>` file stem.
    pub page: Option<u32>,
}

impl EntryClass {
    /// Returns `true` for the first page, which carries the participant list.
    pub fn is_canonical(&self) -> bool {
        self.page == Some(1)
    }
}

/// Classifies an entry path relative to a conversations root.
///
/// `root` may span several segments (`"messages/inbox"`). Both `/` and `\`
/// separators are accepted.
///
/// # Example
///
/// ```rust
/// use inboxpack::classify::classify;
///
/// let class = classify("your_activity/messages/inbox/sam_123/message_1.json", "inbox").unwrap();
/// assert_eq!(class.folder_key, "sam_123");
/// assert!(class.is_canonical());
///
/// assert!(classify("messages/inbox/sam_123/photos/1.jpg", "inbox").is_none());
/// ```
pub fn classify(path: &str, root: &str) -> Option<EntryClass> {
    let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    let root_segments: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
    if root_segments.is_empty() || segments.len() < root_segments.len() + 2 {
        return None;
    }

    let file_idx = segments.len() - 1;
    let key_idx = file_idx - 1;
    if segments[key_idx - root_segments.len()..key_idx] != root_segments[..] {
        return None;
    }

    let (stem, extension) = segments[file_idx].rsplit_once('.')?;
    if stem.is_empty() || !extension.eq_ignore_ascii_case("json") {
        return None;
    }

    Some(EntryClass {
        folder_key: segments[key_idx].to_string(),
        page: page_number(stem),
    })
}

fn page_number(stem: &str) -> Option<u32> {
    stem.strip_prefix("message_")?.parse().ok()
}

/// Returns the page number of a bare file name such as `message_3.json`.
///
/// ```rust
/// use inboxpack::classify::page_of;
///
/// assert_eq!(page_of("message_3.json"), Some(3));
/// assert_eq!(page_of("export.json"), None);
/// ```
pub fn page_of(file_name: &str) -> Option<u32> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, extension) = name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case("json") {
        return None;
    }
    page_number(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_page() {
        let class = classify("messages/inbox/alex_42/message_1.json", "inbox").unwrap();
        assert_eq!(class.folder_key, "alex_42");
        assert_eq!(class.page, Some(1));
        assert!(class.is_canonical());
    }

    #[test]
    fn test_later_page_is_not_canonical() {
        let class = classify("messages/inbox/alex_42/message_12.json", "inbox").unwrap();
        assert_eq!(class.page, Some(12));
        assert!(!class.is_canonical());
    }

    #[test]
    fn test_nested_export_prefix() {
        let class = classify(
            "your_instagram_activity/messages/inbox/alex_42/message_2.json",
            "inbox",
        )
        .unwrap();
        assert_eq!(class.folder_key, "alex_42");
    }

    #[test]
    fn test_unnumbered_json_is_a_member_without_page() {
        let class = classify("messages/inbox/alex_42/notes.json", "inbox").unwrap();
        assert_eq!(class.page, None);
        assert!(!class.is_canonical());
    }

    #[test]
    fn test_media_and_other_paths_are_ignored() {
        assert!(classify("messages/inbox/alex_42/photos/123.jpg", "inbox").is_none());
        assert!(classify("messages/inbox/alex_42/photos/meta.json", "inbox").is_none());
        assert!(classify("messages/inbox/message_1.json", "inbox").is_none());
        assert!(classify("messages/message_requests/x/message_1.json", "inbox").is_none());
        assert!(classify("personal_information/profile.json", "inbox").is_none());
        assert!(classify("messages/inbox/alex_42/", "inbox").is_none());
        assert!(classify("messages/inbox/alex_42/.json", "inbox").is_none());
        assert!(classify("", "inbox").is_none());
    }

    #[test]
    fn test_extension_case_and_backslashes() {
        let class = classify(r"messages\inbox\alex_42\message_1.JSON", "inbox").unwrap();
        assert_eq!(class.folder_key, "alex_42");
        assert!(class.is_canonical());
    }

    #[test]
    fn test_multi_segment_root() {
        let root = "messages/inbox";
        assert!(classify("export/messages/inbox/a/message_1.json", root).is_some());
        assert!(classify("export/other/inbox/a/message_1.json", root).is_none());
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(page_number("message_1"), Some(1));
        assert_eq!(page_number("message_007"), Some(7));
        assert_eq!(page_number("message_"), None);
        assert_eq!(page_number("message_x"), None);
        assert_eq!(page_number("messages_1"), None);
    }
}

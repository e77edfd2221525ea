//! Form 8949 classification and the checkbox markers that select it

use std::fmt;

/// Classification key of a tax lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Box B: short-term, basis not reported to the IRS
    ShortTermNoncovered,
    /// Box E: long-term, basis not reported to the IRS
    LongTermNoncovered,
    /// No checkbox on the statement (self-contained layout)
    Unclassified,
}

impl Category {
    /// TXF refnumber written on the `N` line
    pub fn refnumber(&self) -> u16 {
        match self {
            Category::ShortTermNoncovered => 711,
            Category::LongTermNoncovered => 713,
            Category::Unclassified => 715,
        }
    }

    /// Checkbox letter, if the category comes from a marker
    pub fn checkbox(&self) -> Option<char> {
        match self {
            Category::ShortTermNoncovered => Some('B'),
            Category::LongTermNoncovered => Some('E'),
            Category::Unclassified => None,
        }
    }

    fn from_checkbox(letter: char) -> Option<Self> {
        match letter {
            'B' => Some(Category::ShortTermNoncovered),
            'E' => Some(Category::LongTermNoncovered),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.checkbox() {
            Some(letter) => write!(f, "Box {} Checked", letter),
            None => write!(f, "Unclassified"),
        }
    }
}

/// Detect a checkbox marker such as `Box E checked` anywhere in a line
pub fn detect_marker(line: &str) -> Option<Category> {
    const PREFIX: &str = "Box ";
    const SUFFIX: &str = " checked";

    let mut rest = line;
    while let Some(pos) = rest.find(PREFIX) {
        let after = &rest[pos + PREFIX.len()..];
        let mut chars = after.chars();
        if let Some(letter) = chars.next() {
            if chars.as_str().starts_with(SUFFIX) {
                if let Some(category) = Category::from_checkbox(letter) {
                    return Some(category);
                }
            }
        }
        rest = after;
    }
    None
}

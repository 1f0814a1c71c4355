use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// The five header icon slots, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum HeaderIcon {
    /// Toggles the filter bar.
    Search,
    /// Grid/table layout toggle with a caller-supplied menu.
    Layout,
    /// Export/print with a caller-supplied menu.
    Export,
    AddNew,
    Refresh,
}

impl HeaderIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            HeaderIcon::Search => "⌕ Search",
            HeaderIcon::Layout => "▦ View",
            HeaderIcon::Export => "⇩ Export",
            HeaderIcon::AddNew => "+ Add New",
            HeaderIcon::Refresh => "⟳ Refresh",
        }
    }

    pub fn has_menu(&self) -> bool {
        matches!(self, HeaderIcon::Layout | HeaderIcon::Export)
    }
}

/// Which header icons are shown (`showFirstIcon` .. `showFifthIcon`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderIcons {
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub fourth: bool,
    pub fifth: bool,
}

impl HeaderIcons {
    pub fn all() -> Self {
        Self {
            first: true,
            second: true,
            third: true,
            fourth: true,
            fifth: true,
        }
    }

    pub fn shows(&self, icon: HeaderIcon) -> bool {
        match icon {
            HeaderIcon::Search => self.first,
            HeaderIcon::Layout => self.second,
            HeaderIcon::Export => self.third,
            HeaderIcon::AddNew => self.fourth,
            HeaderIcon::Refresh => self.fifth,
        }
    }

    pub fn visible(&self) -> Vec<HeaderIcon> {
        HeaderIcon::iter().filter(|i| self.shows(*i)).collect()
    }
}

/// What pressing a header icon did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconOutcome {
    /// The icon is not shown; nothing happened.
    Hidden,
    /// Search icon: the filter bar is now open (`true`) or closed.
    FiltersToggled(bool),
    /// Icon with a dropdown: these are the menu labels to present.
    Menu(Vec<String>),
    /// Forwarded to the icon handler.
    Dispatched,
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::TableAction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    #[default]
    Default,
    Vim,
    Arrows,
}

#[derive(Clone, Copy, Debug)]
pub struct TableKeyBindings {
    profile: KeymapProfile,
}

impl Default for TableKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TableKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve<C>(&self, key: KeyEvent) -> Option<TableAction<C>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => Some(TableAction::SelectAll),
                KeyCode::Char('d') => Some(TableAction::DeselectAll),
                _ => None,
            };
        }

        let nav_action = match self.profile {
            KeymapProfile::Default => self.resolve_default_nav(key),
            KeymapProfile::Vim => self.resolve_vim_nav(key),
            KeymapProfile::Arrows => self.resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }

        self.resolve_common(key)
    }

    pub fn resolve_with<C, F>(&self, key: KeyEvent, custom: F) -> Option<TableAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        if let Some(action) = custom(key) {
            return Some(TableAction::Custom(action));
        }

        self.resolve(key)
    }

    const fn resolve_default_nav<C>(&self, key: KeyEvent) -> Option<TableAction<C>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(TableAction::CursorPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(TableAction::CursorNext),
            KeyCode::Char('g') => Some(TableAction::CursorFirst),
            KeyCode::Char('G') => Some(TableAction::CursorLast),
            _ => None,
        }
    }

    const fn resolve_vim_nav<C>(&self, key: KeyEvent) -> Option<TableAction<C>> {
        match key.code {
            KeyCode::Char('k') => Some(TableAction::CursorPrev),
            KeyCode::Char('j') => Some(TableAction::CursorNext),
            KeyCode::Char('g') => Some(TableAction::CursorFirst),
            KeyCode::Char('G') => Some(TableAction::CursorLast),
            _ => None,
        }
    }

    const fn resolve_arrow_nav<C>(&self, key: KeyEvent) -> Option<TableAction<C>> {
        match key.code {
            KeyCode::Up => Some(TableAction::CursorPrev),
            KeyCode::Down => Some(TableAction::CursorNext),
            _ => None,
        }
    }

    fn resolve_common<C>(&self, key: KeyEvent) -> Option<TableAction<C>> {
        match key.code {
            KeyCode::Enter | KeyCode::Left | KeyCode::Right => Some(TableAction::ToggleNode),
            KeyCode::Char(' ') => Some(TableAction::ToggleSelection),
            KeyCode::Char('+') => Some(TableAction::ExpandAll),
            KeyCode::Char('-') => Some(TableAction::CollapseAll),
            KeyCode::Home => Some(TableAction::CursorFirst),
            KeyCode::End => Some(TableAction::CursorLast),
            KeyCode::PageUp => Some(TableAction::PageUp),
            KeyCode::PageDown => Some(TableAction::PageDown),
            _ => None,
        }
    }
}

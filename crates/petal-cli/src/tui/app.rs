use crate::session::{Recognition, Tick};
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Name,
    Care,
}

#[derive(Debug, Clone)]
pub struct FlowerEditorState {
    pub name: String,
    pub care: String,
    pub active: EditorField,
    pub error: Option<String>,
}

impl FlowerEditorState {
    pub fn new(name: String) -> Self {
        let active = if name.is_empty() {
            EditorField::Name
        } else {
            EditorField::Care
        };
        Self {
            name,
            care: String::new(),
            active,
            error: None,
        }
    }

    pub fn active_input(&mut self) -> &mut String {
        match self.active {
            EditorField::Name => &mut self.name,
            EditorField::Care => &mut self.care,
        }
    }

    pub fn next_field(&mut self) {
        self.active = match self.active {
            EditorField::Name => EditorField::Care,
            EditorField::Care => EditorField::Name,
        };
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourcePromptState {
    pub path: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
    AddFlower(FlowerEditorState),
    Source(SourcePromptState),
}

#[derive(Debug)]
pub struct App {
    pub query: String,
    pub results: Vec<String>,
    pub results_state: ListState,
    pub current: Option<Recognition>,
    pub quality: Option<bool>,
    pub source_label: Option<String>,
    pub classifier_ready: bool,
    pub flower_count: usize,
    pub overlay: Option<Overlay>,
    pub toast: Option<Toast>,
    pub dark: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(dark: bool) -> App {
        App {
            query: String::new(),
            results: Vec::new(),
            results_state: ListState::default(),
            current: None,
            quality: None,
            source_label: None,
            classifier_ready: false,
            flower_count: 0,
            overlay: None,
            toast: None,
            dark,
            should_quit: false,
        }
    }

    pub fn set_results(&mut self, results: Vec<String>) {
        self.results = results;
        if self.results.is_empty() {
            self.results_state.select(None);
        } else {
            self.results_state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let next = match self.results_state.selected() {
            Some(idx) if idx + 1 < self.results.len() => idx + 1,
            Some(_) => 0,
            None => 0,
        };
        self.results_state.select(Some(next));
    }

    pub fn prev(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let prev = match self.results_state.selected() {
            Some(0) | None => self.results.len() - 1,
            Some(idx) => idx - 1,
        };
        self.results_state.select(Some(prev));
    }

    pub fn selected_result(&self) -> Option<&str> {
        self.results_state
            .selected()
            .and_then(|idx| self.results.get(idx))
            .map(String::as_str)
    }

    /// Folds one tick into the display. Idle and failed ticks leave the last
    /// recognition on screen.
    pub fn apply_tick(&mut self, tick: Tick) {
        match tick {
            Tick::Idle => {}
            Tick::Quality(blurry) => self.quality = Some(blurry),
            Tick::Recognized(recognition) => {
                self.quality = recognition.blurry;
                self.current = Some(recognition);
            }
            Tick::Failed(message) => {
                if self.toast.is_none() {
                    self.push_toast(ToastLevel::Error, message);
                }
            }
        }
    }

    pub fn select_manual(&mut self, recognition: Recognition) {
        self.current = Some(recognition);
    }

    /// Name used for speech and the Wikipedia link.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|current| current.label.as_str())
    }

    pub fn toggle_theme(&mut self) {
        self.dark = !self.dark;
    }

    pub fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            level,
            expires_at: Instant::now() + Duration::from_secs(3),
        });
    }

    pub fn clear_expired_toast(&mut self) {
        let expired = match &self.toast {
            Some(toast) => Instant::now() >= toast.expires_at,
            None => false,
        };
        if expired {
            self.toast = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognition(label: &str, blurry: bool) -> Recognition {
        Recognition {
            label: label.to_string(),
            confidence: Some(0.8),
            care: None,
            blurry: Some(blurry),
        }
    }

    #[test]
    fn selection_wraps_in_both_directions() {
        let mut app = App::new(true);
        app.set_results(vec!["Rose".to_string(), "Marigold".to_string()]);
        assert_eq!(app.selected_result(), Some("Rose"));
        app.next();
        assert_eq!(app.selected_result(), Some("Marigold"));
        app.next();
        assert_eq!(app.selected_result(), Some("Rose"));
        app.prev();
        assert_eq!(app.selected_result(), Some("Marigold"));
    }

    #[test]
    fn empty_results_clear_selection() {
        let mut app = App::new(true);
        app.set_results(vec!["Rose".to_string()]);
        app.set_results(Vec::new());
        assert_eq!(app.selected_result(), None);
        app.next();
        assert_eq!(app.selected_result(), None);
    }

    #[test]
    fn idle_and_failed_ticks_keep_last_recognition() {
        let mut app = App::new(true);
        app.apply_tick(Tick::Recognized(recognition("Rose", false)));
        app.apply_tick(Tick::Idle);
        app.apply_tick(Tick::Failed("camera unplugged".to_string()));
        assert_eq!(app.current_name(), Some("Rose"));
        assert_eq!(app.quality, Some(false));
        assert_eq!(
            app.toast.as_ref().map(|toast| toast.level),
            Some(ToastLevel::Error)
        );
    }

    #[test]
    fn editor_starts_on_care_when_name_is_known() {
        let mut editor = FlowerEditorState::new("Rose".to_string());
        assert_eq!(editor.active, EditorField::Care);
        editor.active_input().push_str("Water weekly.");
        editor.next_field();
        assert_eq!(editor.active, EditorField::Name);
        assert_eq!(editor.care, "Water weekly.");
    }
}

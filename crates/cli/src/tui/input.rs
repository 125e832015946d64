use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Command,
    /// Collecting a line of text; holds what has been typed so far.
    LineCapture(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
    Ignored,
    Shutdown,
    SelectVhost,
    StopMonitoring,
    Echo(char),
    Erase,
    /// Line submitted with Enter, trimmed.
    Submit(String),
}

/// Routes key presses to either single-key commands or the line being captured.
/// Command bindings are inert while a line is captured; Ctrl+C is always live.
#[derive(Debug)]
pub struct InputRouter {
    mode: InputMode,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self { mode: InputMode::Command }
    }
}

impl InputRouter {
    pub fn is_capturing(&self) -> bool {
        matches!(self.mode, InputMode::LineCapture(_))
    }

    pub fn pending_line(&self) -> Option<&str> {
        match &self.mode {
            InputMode::LineCapture(line) => Some(line),
            InputMode::Command => None,
        }
    }

    pub fn begin_capture(&mut self) {
        self.mode = InputMode::LineCapture(String::new());
    }

    pub fn dispatch(&mut self, key: KeyEvent, monitoring: bool) -> InputAction {
        if key.kind == KeyEventKind::Release {
            return InputAction::Ignored;
        }
        if is_interrupt(&key) {
            return InputAction::Shutdown;
        }
        match &mut self.mode {
            InputMode::LineCapture(line) => match key.code {
                KeyCode::Enter => {
                    let submitted = line.trim().to_string();
                    self.mode = InputMode::Command;
                    InputAction::Submit(submitted)
                }
                KeyCode::Backspace => {
                    if line.pop().is_some() {
                        InputAction::Erase
                    } else {
                        InputAction::Ignored
                    }
                }
                KeyCode::Char(c)
                    if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    line.push(c);
                    InputAction::Echo(c)
                }
                _ => InputAction::Ignored,
            },
            InputMode::Command => match key.code {
                KeyCode::Char('m') if !monitoring => InputAction::SelectVhost,
                KeyCode::Char('s') if monitoring => InputAction::StopMonitoring,
                KeyCode::Char('q') => InputAction::Shutdown,
                _ => InputAction::Ignored,
            },
        }
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_c() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    #[test]
    fn command_keys_depend_on_session_state() {
        let mut r = InputRouter::default();
        assert_eq!(r.dispatch(press('m'), false), InputAction::SelectVhost);
        assert_eq!(r.dispatch(press('m'), true), InputAction::Ignored);
        assert_eq!(r.dispatch(press('s'), true), InputAction::StopMonitoring);
        assert_eq!(r.dispatch(press('s'), false), InputAction::Ignored);
        assert_eq!(r.dispatch(press('x'), false), InputAction::Ignored);
    }

    #[test]
    fn command_keys_are_inert_while_capturing() {
        let mut r = InputRouter::default();
        r.begin_capture();
        assert_eq!(r.dispatch(press('s'), true), InputAction::Echo('s'));
        assert_eq!(r.dispatch(press('m'), false), InputAction::Echo('m'));
        assert_eq!(r.dispatch(press('q'), false), InputAction::Echo('q'));
        assert_eq!(r.pending_line(), Some("smq"));
        assert!(r.is_capturing());
    }

    #[test]
    fn interrupt_is_live_in_both_modes() {
        let mut r = InputRouter::default();
        assert_eq!(r.dispatch(ctrl_c(), true), InputAction::Shutdown);
        r.begin_capture();
        assert_eq!(r.dispatch(ctrl_c(), false), InputAction::Shutdown);
    }

    #[test]
    fn erase_on_empty_line_is_a_no_op() {
        let mut r = InputRouter::default();
        r.begin_capture();
        assert_eq!(r.dispatch(code(KeyCode::Backspace), false), InputAction::Ignored);
        r.dispatch(press('1'), false);
        r.dispatch(press('2'), false);
        assert_eq!(r.dispatch(code(KeyCode::Backspace), false), InputAction::Erase);
        assert_eq!(r.pending_line(), Some("1"));
    }

    #[test]
    fn submit_trims_and_returns_to_command_mode() {
        let mut r = InputRouter::default();
        r.begin_capture();
        for c in [' ', '3', ' '] {
            r.dispatch(press(c), false);
        }
        assert_eq!(r.dispatch(code(KeyCode::Enter), false), InputAction::Submit("3".into()));
        assert_eq!(r.mode, InputMode::Command);
        assert_eq!(r.dispatch(press('m'), false), InputAction::SelectVhost);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut r = InputRouter::default();
        let mut key = press('m');
        key.kind = KeyEventKind::Release;
        assert_eq!(r.dispatch(key, false), InputAction::Ignored);
    }
}
